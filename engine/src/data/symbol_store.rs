// Keyed ownership of every tracked symbol's state.
use crate::error::EngineError;
use crate::models::SymbolState;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct SymbolStateStore {
    states: HashMap<String, SymbolState>,
}

impl SymbolStateStore {
    pub fn new() -> Self {
        SymbolStateStore {
            states: HashMap::new(),
        }
    }

    // Registers one blank state per symbol, replacing anything held before.
    pub fn initialize_all(&mut self, symbols: &[String], history_limit: usize) {
        self.states = symbols
            .iter()
            .map(|s| (s.clone(), SymbolState::new(s, history_limit)))
            .collect();
    }

    pub fn get(&self, symbol: &str) -> Result<&SymbolState, EngineError> {
        self.states
            .get(symbol)
            .ok_or_else(|| EngineError::UnknownSymbol(symbol.to_string()))
    }

    pub fn get_mut(&mut self, symbol: &str) -> Result<&mut SymbolState, EngineError> {
        self.states
            .get_mut(symbol)
            .ok_or_else(|| EngineError::UnknownSymbol(symbol.to_string()))
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.states.contains_key(symbol)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
