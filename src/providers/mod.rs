pub mod remote;

pub use remote::HttpAnalysisService;
