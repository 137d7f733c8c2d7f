//! Core value types shared across the canopy RT components

pub mod elementwise;
pub mod irradiance;
pub mod optics;
pub mod profile;
pub mod radiation;

pub use elementwise::Elementwise;
pub use irradiance::{SpectralBand, TopOfCanopyIrradiance};
pub(crate) use irradiance::check_zenith;
pub use optics::{LeafOpticalProperties, SpectralOptics};
pub use profile::CanopyLayerProfile;
pub use radiation::RadiationProfile;
