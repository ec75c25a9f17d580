//! Modal key handling for menus, prompts and the help screen

use crate::state::State;
use crate::Result;

/// What the stack should do with a handler after it saw a key
pub enum HandlerAction {
    /// Key consumed, handler stays active
    Handled,
    /// Handler is done, drop it from the stack
    Remove,
    /// Keep this handler and open another one on top of it
    Push(Box<dyn KeyHandler>),
}

/// One layer of keyboard input
///
/// The bottom of the experience is the panel itself; menus, prompts and
/// the help screen are handlers stacked on top of it, each seeing every
/// key until it removes itself.
pub trait KeyHandler {
    /// Process a key sequence
    fn process(&mut self, key: &[u8], state: &mut State) -> Result<HandlerAction>;

    /// Paint this handler's screen
    ///
    /// Called whenever the handler is, or becomes, the top of the
    /// stack. The default paints nothing.
    fn redraw(&self, _state: &State) -> Result<()> {
        Ok(())
    }
}

/// Modal handlers in opening order, the newest one gets the input
pub struct HandlerStack {
    handlers: Vec<Box<dyn KeyHandler>>,
}

impl HandlerStack {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    pub fn push(&mut self, handler: Box<dyn KeyHandler>) {
        self.handlers.push(handler);
    }

    pub fn pop(&mut self) -> Option<Box<dyn KeyHandler>> {
        self.handlers.pop()
    }

    pub fn last(&self) -> Option<&dyn KeyHandler> {
        self.handlers.last().map(|h| h.as_ref())
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl Default for HandlerStack {
    fn default() -> Self {
        Self::new()
    }
}
