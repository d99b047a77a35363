use super::key::{FeatureKey, Role, Section};
use super::value::{FeatureValue, Rect4, ValueError};
use log::{debug, warn};
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Inheritance {
    /// Common map, applies to every resolution.
    Base,
    /// Resolution override map.
    Derived,
    /// Neither map holds the key.
    Unset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[inline(always)]
    pub const fn dims(self) -> [u32; 2] {
        [self.width, self.height]
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for Resolution {
    type Err = String;

    /// Accepts `1024x768` or `1024 768`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (w, h) = s
            .split_once(['x', 'X'])
            .or_else(|| s.split_once(char::is_whitespace))
            .ok_or_else(|| format!("resolution '{s}' is not WIDTHxHEIGHT"))?;
        let parse = |t: &str| {
            t.trim()
                .parse::<u32>()
                .ok()
                .filter(|v| *v > 0)
                .ok_or_else(|| format!("invalid resolution component '{}' in '{s}'", t.trim()))
        };
        Ok(Self::new(parse(w)?, parse(h)?))
    }
}

/// Which map set a query reads: design mode uses the common map only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Target {
    Design,
    Resolution(Resolution),
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Design => f.write_str("all resolutions"),
            Self::Resolution(res) => write!(f, "{res}"),
        }
    }
}

/// Feature key to value mapping; keys are unique.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureMap {
    entries: FxHashMap<FeatureKey, FeatureValue>,
}

impl FeatureMap {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    pub fn get(&self, key: FeatureKey) -> Option<&FeatureValue> {
        self.entries.get(&key)
    }

    pub fn insert(&mut self, key: FeatureKey, value: FeatureValue) -> Option<FeatureValue> {
        self.entries.insert(key, value)
    }

    /// Inserts after checking the value variant against the key's role.
    pub fn insert_checked(
        &mut self,
        key: FeatureKey,
        value: FeatureValue,
    ) -> Result<Option<FeatureValue>, ValueError> {
        if !key.role().accepts(&value) {
            return Err(ValueError::RoleMismatch {
                key: key.name(),
                role: key.role().as_str(),
                kind: value.kind(),
            });
        }
        Ok(self.insert(key, value))
    }

    /// Parses `text` the way the key's role stores values and inserts it.
    pub fn set_text(&mut self, key: FeatureKey, text: &str) -> Result<(), ValueError> {
        let value = key.role().parse_value(text)?;
        self.insert(key, value);
        Ok(())
    }

    pub fn remove(&mut self, key: FeatureKey) -> Option<FeatureValue> {
        self.entries.remove(&key)
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in taxonomy order.
    pub fn iter_sorted(&self) -> impl Iterator<Item = (FeatureKey, &FeatureValue)> {
        let mut items: Vec<_> = self.entries.iter().map(|(k, v)| (*k, v)).collect();
        items.sort_by_key(|(k, _)| *k);
        items.into_iter()
    }
}

impl FromIterator<(FeatureKey, FeatureValue)> for FeatureMap {
    fn from_iter<I: IntoIterator<Item = (FeatureKey, FeatureValue)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// A resolved lookup: the effective value, if any, and its origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolved<'a> {
    pub value: Option<&'a FeatureValue>,
    pub inheritance: Inheritance,
}

/// Read-only view merging the common map with at most one override map.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    common: &'a FeatureMap,
    overrides: Option<&'a FeatureMap>,
}

impl<'a> Resolver<'a> {
    /// Design-mode view: the override maps are never consulted.
    pub const fn design(common: &'a FeatureMap) -> Self {
        Self {
            common,
            overrides: None,
        }
    }

    pub const fn with_override(common: &'a FeatureMap, overrides: Option<&'a FeatureMap>) -> Self {
        Self { common, overrides }
    }

    pub fn resolve(&self, key: FeatureKey) -> Resolved<'a> {
        if let Some(value) = self.overrides.and_then(|m| m.get(key)) {
            return Resolved {
                value: Some(value),
                inheritance: Inheritance::Derived,
            };
        }
        match self.common.get(key) {
            Some(value) => Resolved {
                value: Some(value),
                inheritance: Inheritance::Base,
            },
            None => Resolved {
                value: None,
                inheritance: Inheritance::Unset,
            },
        }
    }

    /// Resolves and applies `extract`; a value of the wrong variant is logged
    /// and treated as unresolved.
    fn typed<T>(
        &self,
        key: FeatureKey,
        expected: Role,
        extract: impl FnOnce(&'a FeatureValue) -> Option<T>,
    ) -> Option<(T, Inheritance)> {
        let resolved = self.resolve(key);
        let value = resolved.value?;
        if key.role() != expected {
            warn!(
                "{} is a {} key, looked up as {}; ignoring it",
                key.name(),
                key.role(),
                expected
            );
            return None;
        }
        match extract(value) {
            Some(v) => Some((v, resolved.inheritance)),
            None => {
                warn!(
                    "{} holds a {} value, which a {} key cannot use; treating it as unset",
                    key.name(),
                    value.kind().as_str(),
                    key.role()
                );
                None
            }
        }
    }

    pub fn image(&self, key: FeatureKey) -> Option<(&'a str, Inheritance)> {
        self.typed(key, Role::Picture, FeatureValue::as_image)
    }

    /// Position box of a picture-position or text key.
    pub fn rect(&self, key: FeatureKey) -> Option<(Rect4, Inheritance)> {
        let expected = if key.role() == Role::Text {
            Role::Text
        } else {
            Role::PicturePosition
        };
        self.typed(key, expected, FeatureValue::as_rect)
    }

    pub fn int(&self, key: FeatureKey) -> Option<(i32, Inheritance)> {
        self.typed(key, Role::Value, FeatureValue::as_int)
    }

    /// Fresh effective map for every key of `section`.
    pub fn resolved_map(&self, section: Section) -> FeatureMap {
        section
            .keys()
            .filter_map(|key| self.resolve(key).value.map(|v| (key, v.clone())))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionOverride {
    pub resolution: Resolution,
    pub map: FeatureMap,
}

/// One loaded interface: the common map plus per-resolution overrides.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Interface {
    pub common: FeatureMap,
    overrides: Vec<ResolutionOverride>,
}

impl Interface {
    pub fn new(common: FeatureMap) -> Self {
        Self {
            common,
            overrides: Vec::new(),
        }
    }

    pub fn overrides(&self) -> &[ResolutionOverride] {
        &self.overrides
    }

    pub fn resolutions(&self) -> impl Iterator<Item = Resolution> + '_ {
        self.overrides.iter().map(|o| o.resolution)
    }

    pub fn override_map(&self, resolution: Resolution) -> Option<&FeatureMap> {
        self.overrides
            .iter()
            .find(|o| o.resolution == resolution)
            .map(|o| &o.map)
    }

    /// Override map for `resolution`, created empty when missing.
    pub fn override_map_mut(&mut self, resolution: Resolution) -> &mut FeatureMap {
        let idx = match self.overrides.iter().position(|o| o.resolution == resolution) {
            Some(idx) => idx,
            None => {
                debug!("Adding resolution override {resolution}");
                self.overrides.push(ResolutionOverride {
                    resolution,
                    map: FeatureMap::new(),
                });
                self.overrides.sort_by_key(|o| o.resolution);
                self.overrides
                    .iter()
                    .position(|o| o.resolution == resolution)
                    .unwrap_or(self.overrides.len() - 1)
            }
        };
        &mut self.overrides[idx].map
    }

    pub fn resolver(&self, target: Target) -> Resolver<'_> {
        match target {
            Target::Design => Resolver::design(&self.common),
            Target::Resolution(res) => Resolver::with_override(&self.common, self.override_map(res)),
        }
    }

    /// Writes an edited value where the editor's current target says it
    /// belongs and returns the inheritance it now resolves with.
    pub fn apply_edit(
        &mut self,
        key: FeatureKey,
        value: FeatureValue,
        target: Target,
    ) -> Result<Inheritance, ValueError> {
        match target {
            Target::Design => {
                self.common.insert_checked(key, value)?;
                Ok(Inheritance::Base)
            }
            Target::Resolution(res) => {
                self.override_map_mut(res).insert_checked(key, value)?;
                Ok(Inheritance::Derived)
            }
        }
    }

    /// Drops the override for `key` so it inherits from the common map again.
    pub fn revert(&mut self, key: FeatureKey, resolution: Resolution) -> Option<FeatureValue> {
        let entry = self
            .overrides
            .iter_mut()
            .find(|o| o.resolution == resolution)?;
        let removed = entry.map.remove(key);
        if entry.map.is_empty() {
            self.overrides.retain(|o| o.resolution != resolution);
        }
        removed
    }
}
