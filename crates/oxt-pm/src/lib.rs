pub mod environment;
pub mod error;
pub mod installed;
pub mod manifest;
pub mod py_package;
pub mod requirement_spec;
pub mod requirements_check;

pub use environment::{Environment, Platform};
pub use error::{RequirementsError, Result};
pub use installed::{normalize_name, require_installed, PackageLookup, SitePackages};
pub use manifest::Manifest;
pub use py_package::PyPackage;
pub use requirement_spec::RequirementSpec;
pub use requirements_check::{
    CheckReport, PackageReport, PackageStatus, PinnedReport, PinnedStatus, RequirementPolicy,
    RequirementsCheck,
};
