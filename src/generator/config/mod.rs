pub mod formats;
pub mod line_builder;
pub mod ruleconvert;
