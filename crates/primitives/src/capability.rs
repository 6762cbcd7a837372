use core::fmt;
use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum::{IntoEnumIterator, VariantNames};

/// A module tag granting access to one functional area.
///
/// The set is closed: anything outside it fails to parse, so stray tags can
/// never be stored or granted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::IntoStaticStr)] // Into<&'static str>, AsRef<str>
#[derive(strum::VariantNames)] // Capability::VARIANTS
#[derive(strum::VariantArray)] // Capability::VARIANTS
#[derive(strum::EnumString)] // FromStr, TryFrom<&str>
#[derive(strum::EnumIter)] // Capability::iter
#[derive(strum::EnumCount)] // Capability::COUNT
#[strum(serialize_all = "lowercase")]
pub enum Capability {
    /// Human resources: officer roster and registration.
    Rrhh,
    /// Police operations.
    Policial,
    /// Citizen complaints.
    Denuncias,
    /// Detainee records.
    Detenidos,
    /// Operational logbook.
    Minutas,
    /// Wanted persons.
    Buscados,
    /// Identity verification.
    Verificacion,
    /// Panic button alerts.
    Panico,
}

impl Capability {
    /// Returns the wire name of the tag.
    #[inline]
    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    /// Human readable module name, used by the module listing endpoint.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Rrhh => "Recursos Humanos",
            Self::Policial => "Policial",
            Self::Denuncias => "Denuncias",
            Self::Detenidos => "Detenidos",
            Self::Minutas => "Minutas",
            Self::Buscados => "Buscados",
            Self::Verificacion => "Verificación",
            Self::Panico => "Botón de Pánico",
        }
    }
}

impl fmt::Display for Capability {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_str().fmt(f)
    }
}

impl AsRef<str> for Capability {
    #[inline]
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Serialize for Capability {
    #[inline]
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Capability {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(d)?;
        raw.parse()
            .map_err(|_| serde::de::Error::unknown_variant(&raw, Self::VARIANTS))
    }
}

/// Error returned when a tag outside the closed set is supplied.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown module: {0}")]
pub struct UnknownCapability(pub String);

/// The set of tags held by an administrator.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct CapabilitySet(BTreeSet<Capability>);

impl CapabilitySet {
    /// An empty set.
    pub const fn empty() -> Self {
        Self(BTreeSet::new())
    }

    /// The full set of tags.
    pub fn all() -> Self {
        Self(Capability::iter().collect())
    }

    /// Parses a list of wire names, rejecting the first unknown one.
    pub fn parse<I, S>(tags: I) -> Result<Self, UnknownCapability>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        tags.into_iter()
            .map(|tag| {
                let tag = tag.as_ref();
                tag.parse::<Capability>()
                    .map_err(|_| UnknownCapability(tag.to_owned()))
            })
            .collect()
    }

    pub fn contains(&self, capability: Capability) -> bool {
        self.0.contains(&capability)
    }

    /// Returns true when every tag of the closed set is held.
    pub fn is_full(&self) -> bool {
        Capability::iter().all(|c| self.0.contains(&c))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn insert(&mut self, capability: Capability) -> bool {
        self.0.insert(capability)
    }

    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<T: IntoIterator<Item = Capability>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<const N: usize> From<[Capability; N]> for CapabilitySet {
    fn from(tags: [Capability; N]) -> Self {
        tags.into_iter().collect()
    }
}

impl Serialize for CapabilitySet {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_seq(self.0.iter())
    }
}

impl<'de> Deserialize<'de> for CapabilitySet {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        // Each element goes through `Capability::deserialize`, which rejects
        // unknown tags.
        let tags = Vec::<Capability>::deserialize(d)?;
        Ok(tags.into_iter().collect())
    }
}
