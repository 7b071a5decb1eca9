//! CoTools Tools
//!
//! Concrete tool capabilities and the invocation boundary that resolves tool
//! names to them. Capabilities are external collaborators from the reasoning
//! core's perspective; the implementations here are simulated stand-ins with
//! realistic shapes, matching the default catalogue entries by name.

pub mod builtin;
pub mod capability;
pub mod executor;

pub use builtin::{
    CalculatorApi, CapitalApi, NewsSearch, ProjectFileProcessor, SearchApi, TranslateApi,
    WeatherApi, WebContentFetcher, WebSearch,
};
pub use capability::{get_num, get_str, require_str, ToolCapability};
pub use executor::ToolExecutor;
