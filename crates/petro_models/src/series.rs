//! Unified key over raw commodity series and derived fields.

use std::fmt;

use petro_core::types::Commodity;

use crate::derived::DerivedField;

/// Key for sensitivities and snapshot fields.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SeriesKey {
    /// A raw commodity price
    Commodity(Commodity),
    /// A quantity derived from same-row commodity prices
    Derived(DerivedField),
}

impl SeriesKey {
    /// Every series projected against crude, raw commodities first then
    /// derived fields, in column order. Crude itself is excluded.
    pub fn tracked() -> Vec<SeriesKey> {
        Commodity::projected()
            .map(SeriesKey::Commodity)
            .chain(DerivedField::ALL.into_iter().map(SeriesKey::Derived))
            .collect()
    }

    /// Every key including crude, in column order.
    pub fn all() -> Vec<SeriesKey> {
        std::iter::once(SeriesKey::Commodity(Commodity::Wti))
            .chain(Self::tracked())
            .collect()
    }

    /// Short code used in CSV column names.
    pub fn code(&self) -> &'static str {
        match self {
            SeriesKey::Commodity(c) => c.code(),
            SeriesKey::Derived(d) => d.code(),
        }
    }

    /// Human-readable name.
    pub fn display_name(&self) -> &'static str {
        match self {
            SeriesKey::Commodity(c) => c.display_name(),
            SeriesKey::Derived(d) => d.display_name(),
        }
    }

    /// Whether this is the crude benchmark.
    pub fn is_crude(&self) -> bool {
        matches!(self, SeriesKey::Commodity(c) if c.is_crude())
    }
}

impl From<Commodity> for SeriesKey {
    fn from(c: Commodity) -> Self {
        SeriesKey::Commodity(c)
    }
}

impl From<DerivedField> for SeriesKey {
    fn from(d: DerivedField) -> Self {
        SeriesKey::Derived(d)
    }
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_tracked_excludes_crude() {
        let tracked = SeriesKey::tracked();
        assert_eq!(tracked.len(), 9 + DerivedField::ALL.len());
        assert!(tracked.iter().all(|k| !k.is_crude()));
        assert_eq!(tracked[0], SeriesKey::Commodity(Commodity::Naphtha));
    }

    #[test]
    fn test_all_starts_with_crude() {
        let all = SeriesKey::all();
        assert!(all[0].is_crude());
        assert_eq!(all.len(), SeriesKey::tracked().len() + 1);
    }

    #[test]
    fn test_codes_unique() {
        let codes: HashSet<_> = SeriesKey::all().iter().map(|k| k.code()).collect();
        assert_eq!(codes.len(), SeriesKey::all().len());
    }

    #[test]
    fn test_from_and_display() {
        let key: SeriesKey = Commodity::Butadiene.into();
        assert_eq!(key.to_string(), "BD");
        let key: SeriesKey = DerivedField::AbsGapActual.into();
        assert_eq!(key.to_string(), "ABS_Gap");
    }
}
