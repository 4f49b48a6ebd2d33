pub mod diagnostics;
pub mod history;
pub mod recommendations;
pub mod stats;

use std::fmt;

/// A request selector the caller got wrong. Detected before any query is
/// issued; the message is safe to hand back to the caller verbatim.
#[derive(Debug, Clone)]
pub struct InvalidArgument {
    pub param: &'static str,
    pub detail: String,
}

impl fmt::Display for InvalidArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: {}", self.param, self.detail)
    }
}

impl std::error::Error for InvalidArgument {}

/// Which recommendation dataset to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Model {
    TopCtr,
    TopProducts,
}

impl Model {
    pub fn parse(s: &str) -> Result<Self, InvalidArgument> {
        match s {
            "top_ctr" => Ok(Model::TopCtr),
            "top_products" => Ok(Model::TopProducts),
            other => Err(InvalidArgument {
                param: "model",
                detail: format!("'{other}' is not recognized; use 'top_ctr' or 'top_products'"),
            }),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Model::TopCtr => "top_ctr",
            Model::TopProducts => "top_products",
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Grouping axis for the diagnostic counts endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticMetric {
    Adv,
    Product,
}

impl DiagnosticMetric {
    pub fn parse(s: &str) -> Result<Self, InvalidArgument> {
        match s {
            "adv" => Ok(DiagnosticMetric::Adv),
            "product" => Ok(DiagnosticMetric::Product),
            other => Err(InvalidArgument {
                param: "metric",
                detail: format!("'{other}' is not recognized; use 'adv' or 'product'"),
            }),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticMetric::Adv => "adv",
            DiagnosticMetric::Product => "product",
        }
    }
}
