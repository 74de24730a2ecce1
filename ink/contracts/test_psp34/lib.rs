#![cfg_attr(not(feature = "std"), no_std, no_main)]

/// Prize collection deployed by the integration tests.
/// The owner can pause it: no token moves while it is paused.
#[openbrush::implementation(PSP34, Ownable, Pausable)]
#[openbrush::contract]
pub mod test_psp34 {
    use openbrush::contracts::pausable::PausableError;
    use openbrush::traits::{Storage, String};

    #[ink(storage)]
    #[derive(Default, Storage)]
    pub struct Contract {
        #[storage_field]
        psp34: psp34::Data,
        #[storage_field]
        ownable: ownable::Data,
        #[storage_field]
        pausable: pausable::Data,
    }

    #[overrider(psp34::Internal)]
    fn _before_token_transfer(
        &mut self,
        _from: Option<&AccountId>,
        _to: Option<&AccountId>,
        _id: &Id,
    ) -> Result<(), PSP34Error> {
        if pausable::Internal::_paused(self) {
            return Err(PSP34Error::Custom(String::from("Paused")));
        }
        Ok(())
    }

    impl Contract {
        #[ink(constructor)]
        pub fn new() -> Self {
            let mut instance = Self::default();
            let caller = instance.env().caller();
            ownable::Internal::_init_with_owner(&mut instance, caller);
            instance
        }

        #[ink(message)]
        pub fn mint(&mut self, to: AccountId, id: Id) -> Result<(), PSP34Error> {
            self.ensure_owner()?;
            psp34::Internal::_mint_to(self, to, id)
        }

        #[ink(message)]
        pub fn pause(&mut self) -> Result<(), PSP34Error> {
            self.ensure_owner()?;
            let result: Result<(), PausableError> = pausable::Internal::_pause(self);
            result.map_err(|_| PSP34Error::Custom(String::from("Already paused")))
        }

        #[ink(message)]
        pub fn unpause(&mut self) -> Result<(), PSP34Error> {
            self.ensure_owner()?;
            let result: Result<(), PausableError> = pausable::Internal::_unpause(self);
            result.map_err(|_| PSP34Error::Custom(String::from("Not paused")))
        }

        fn ensure_owner(&self) -> Result<(), PSP34Error> {
            if Ownable::owner(self) != Some(self.env().caller()) {
                return Err(PSP34Error::Custom(String::from("Not owner")));
            }
            Ok(())
        }
    }

}
