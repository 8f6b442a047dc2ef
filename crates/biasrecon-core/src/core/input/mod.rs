//! Extraction of bias-method arguments from a PLUMED input file.
//!
//! The parser locates the action named by the bias type (e.g. `METAD`) and collects
//! its `KEY=value` and `KEY="quoted value"` tokens into [`arguments::BiasArguments`].
//! Symbolic values such as `pi` are kept as text; they are resolved by the grid model.

pub mod arguments;
pub mod parser;
