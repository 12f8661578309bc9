pub mod coverage;
pub mod parse;
pub mod run;
