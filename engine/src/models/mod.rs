// Engine-internal state. Models exchanged with presentation live in `shared::models`.
pub mod symbol_state;

pub use symbol_state::SymbolState;
