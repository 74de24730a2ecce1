#![cfg_attr(not(feature = "std"), no_std, no_main)]

/// Settlement currency deployed by the integration tests
#[openbrush::implementation(PSP22)]
#[openbrush::contract]
pub mod test_psp22 {
    use openbrush::traits::Storage;

    #[ink(storage)]
    #[derive(Default, Storage)]
    pub struct Contract {
        #[storage_field]
        psp22: psp22::Data,
    }

    impl Contract {
        /// the whole supply goes to the deployer
        #[ink(constructor)]
        pub fn new(total_supply: Balance) -> Result<Self, PSP22Error> {
            let mut instance = Self::default();
            let caller = instance.env().caller();
            psp22::Internal::_mint_to(&mut instance, caller, total_supply)?;
            Ok(instance)
        }
    }

}
