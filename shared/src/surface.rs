//! Spatial surface query seam.
//!
//! The room scanning service is external. Spawn placement and ground contact only need
//! "is there room geometry" and "nearest labelled hit along this ray".

use std::fmt;

use crate::{
    bitmask_flags::SurfaceFilter,
    types::{Ray, SurfaceHit},
};

/// Availability of room geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SurfaceStatus {
    /// No scene service at all.
    Missing,
    /// Service present, still loading.
    Initializing,
    /// Service ready but no room is loaded.
    NoRoom,
    /// A room is loaded and can be queried.
    Tracking,
}

impl SurfaceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Missing => "Missing",
            Self::Initializing => "Initializing",
            Self::NoRoom => "NoRoom",
            Self::Tracking => "Tracking",
        }
    }
}

impl fmt::Display for SurfaceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub trait SurfaceQuery {
    fn status(&self) -> SurfaceStatus;

    /// Nearest hit within `max_distance` against surfaces passing `filter`.
    fn raycast(&self, ray: &Ray, max_distance: f32, filter: SurfaceFilter) -> Option<SurfaceHit>;

    #[inline]
    fn is_available(&self) -> bool {
        self.status() == SurfaceStatus::Tracking
    }
}

impl<T: SurfaceQuery + ?Sized> SurfaceQuery for &T {
    fn status(&self) -> SurfaceStatus {
        (**self).status()
    }

    fn raycast(&self, ray: &Ray, max_distance: f32, filter: SurfaceFilter) -> Option<SurfaceHit> {
        (**self).raycast(ray, max_distance, filter)
    }
}

/// No service installed → `Missing`.
impl<T: SurfaceQuery> SurfaceQuery for Option<T> {
    fn status(&self) -> SurfaceStatus {
        self.as_ref().map_or(SurfaceStatus::Missing, |s| s.status())
    }

    fn raycast(&self, ray: &Ray, max_distance: f32, filter: SurfaceFilter) -> Option<SurfaceHit> {
        self.as_ref()?.raycast(ray, max_distance, filter)
    }
}
