//! Help screen handler
//!
//! Shows the key reference until any key is pressed.

use super::{HandlerAction, KeyHandler};
use crate::state::State;
use crate::Result;

pub struct HelpHandler;

impl KeyHandler for HelpHandler {
    fn process(&mut self, _key: &[u8], _state: &mut State) -> Result<HandlerAction> {
        Ok(HandlerAction::Remove)
    }

    fn redraw(&self, state: &State) -> Result<()> {
        state.panel.draw_help()
    }
}
