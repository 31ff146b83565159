use num_traits::{One, PrimInt};

/// Storage used for surface label masks.
///
/// `u32` fits every label and converts losslessly into Rapier's `u128` collider user data.
pub type LabelContainer = u32;

/// Trait implemented by flag enums whose discriminant is a bit index.
///
/// You choose the backing integer type via the associated `Storage`.
pub trait FlagBitmask {
    type Storage: PrimInt;

    fn bit_index(&self) -> u8;

    fn mask(&self) -> Self::Storage {
        // NOTE: `bit_index()` must be < number of bits in `Storage`.
        Self::Storage::one() << (self.bit_index() as usize)
    }
}

/// A plain bitmask container over some primitive integer.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq)]
pub struct BitmaskFlags<T: PrimInt> {
    pub bits: T,
}

impl<T: PrimInt> BitmaskFlags<T> {
    pub fn new(bits: T) -> Self {
        Self { bits }
    }

    pub fn add<U: FlagBitmask<Storage = T>>(&mut self, tag: U) {
        self.bits = self.bits | tag.mask();
    }

    pub fn remove<U: FlagBitmask<Storage = T>>(&mut self, tag: U) {
        self.bits = self.bits & !tag.mask();
    }

    pub fn has<U: FlagBitmask<Storage = T>>(&self, tag: U) -> bool {
        (self.bits & tag.mask()) != T::zero()
    }

    pub fn from_tags<U: FlagBitmask<Storage = T> + Copy>(tags: &[U]) -> Self {
        let mut flags = Self::new(T::zero());
        for &tag in tags {
            flags.add(tag);
        }
        flags
    }

    /// True if any bit is shared with `bits`.
    pub fn intersects(&self, bits: T) -> bool {
        (self.bits & bits) != T::zero()
    }

    pub fn is_empty(&self) -> bool {
        self.bits == T::zero()
    }
}

/// Semantic label of a room surface, as reported by the scene understanding service.
///
/// The discriminant is the bit index inside a [`SurfaceFilter`]. Do not reorder: masks are
/// stored in collider user data.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SurfaceLabel {
    Floor = 0,
    Ceiling = 1,
    WallFace = 2,
    Table = 3,
    Couch = 4,
    GlobalMesh = 5,
    Other = 6,
}

impl FlagBitmask for SurfaceLabel {
    type Storage = LabelContainer;

    fn bit_index(&self) -> u8 {
        *self as u8
    }
}

/// Set of surface labels a query accepts.
pub type SurfaceFilter = BitmaskFlags<LabelContainer>;

impl SurfaceFilter {
    /// Floor planes plus the scanned global mesh. Used by both spawn and contact probes.
    pub fn floor_and_global_mesh() -> Self {
        Self::from_tags(&[SurfaceLabel::Floor, SurfaceLabel::GlobalMesh])
    }

    /// Accept every label.
    pub fn all() -> Self {
        Self::new(LabelContainer::MAX)
    }

    /// Does a surface carrying `label` pass this filter?
    pub fn accepts(&self, label: SurfaceLabel) -> bool {
        self.has(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floor_and_global_mesh_filter_rejects_walls() {
        let filter = SurfaceFilter::floor_and_global_mesh();

        assert!(filter.accepts(SurfaceLabel::Floor));
        assert!(filter.accepts(SurfaceLabel::GlobalMesh));
        assert!(!filter.accepts(SurfaceLabel::WallFace));
        assert!(!filter.accepts(SurfaceLabel::Table));
        assert_eq!(filter.bits, 0b10_0001);
    }

    #[test]
    fn add_and_remove_toggle_single_bits() {
        let mut filter = SurfaceFilter::default();
        assert!(filter.is_empty());

        filter.add(SurfaceLabel::Table);
        assert!(filter.has(SurfaceLabel::Table));
        assert!(filter.intersects(SurfaceLabel::Table.mask()));

        filter.remove(SurfaceLabel::Table);
        assert!(!filter.has(SurfaceLabel::Table));
        assert!(filter.is_empty());
    }

    #[test]
    fn all_filter_accepts_every_label() {
        let filter = SurfaceFilter::all();
        for label in [
            SurfaceLabel::Floor,
            SurfaceLabel::Ceiling,
            SurfaceLabel::WallFace,
            SurfaceLabel::Table,
            SurfaceLabel::Couch,
            SurfaceLabel::GlobalMesh,
            SurfaceLabel::Other,
        ] {
            assert!(filter.accepts(label));
        }
    }
}
