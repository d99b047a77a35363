use super::sections::{self, KeyDef, SectionDef};
use super::value::{FeatureValue, ValueError, ValueKind};
use rustc_hash::FxHashMap;
use serde::{Serialize, Serializer};
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Semantic role of a feature key; decides which value variants it may hold
/// and how the layout build treats it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Role {
    Picture,
    PicturePosition,
    Text,
    Value,
    Offset,
    Unknown,
}

impl Role {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Picture => "Picture",
            Self::PicturePosition => "PicturePosition",
            Self::Text => "Text",
            Self::Value => "Value",
            Self::Offset => "Offset",
            Self::Unknown => "Unknown",
        }
    }

    pub fn accepts(self, value: &FeatureValue) -> bool {
        match (self, value) {
            (Self::Unknown, _) => true,
            (Self::Picture, FeatureValue::Image(_)) => true,
            (Self::PicturePosition | Self::Text, FeatureValue::Rect4(_)) => true,
            (Self::Value, FeatureValue::Single(_) | FeatureValue::Array(_)) => true,
            (
                Self::Offset,
                FeatureValue::Single(_) | FeatureValue::Array(_) | FeatureValue::Vector4(_),
            ) => true,
            _ => false,
        }
    }

    /// Parses one textual value the way a key of this role stores it.
    pub fn parse_value(self, text: &str) -> Result<FeatureValue, ValueError> {
        let tokens = text.split_whitespace().count();
        let kind = match self {
            Self::Picture => ValueKind::Image,
            Self::PicturePosition | Self::Text => ValueKind::Rect4,
            Self::Value if tokens == 1 => ValueKind::Single,
            Self::Value => ValueKind::Array,
            Self::Offset if tokens == 1 => ValueKind::Single,
            Self::Offset if tokens == 4 && text.split_whitespace().any(|t| t.parse::<i32>().is_err()) => {
                ValueKind::Vector4
            }
            Self::Offset => ValueKind::Array,
            Self::Unknown => return FeatureValue::parse_any(text),
        };
        FeatureValue::parse(kind, text)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One editable interface screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Section {
    Login,
    Game,
    Inventory,
    GlobalMap,
    Dialog,
    Character,
}

impl Section {
    pub const ALL: [Self; 6] = [
        Self::Login,
        Self::Game,
        Self::Inventory,
        Self::GlobalMap,
        Self::Dialog,
        Self::Character,
    ];

    pub fn def(self) -> &'static SectionDef {
        match self {
            Self::Login => &sections::LOGIN,
            Self::Game => &sections::GAME,
            Self::Inventory => &sections::INVENTORY,
            Self::GlobalMap => &sections::GLOBAL_MAP,
            Self::Dialog => &sections::DIALOG,
            Self::Character => &sections::CHARACTER,
        }
    }

    #[inline(always)]
    pub fn prefix(self) -> &'static str {
        self.def().prefix
    }

    #[inline(always)]
    pub fn title(self) -> &'static str {
        self.def().title
    }

    #[inline(always)]
    pub fn relative_to_main(self) -> bool {
        self.def().relative_to_main
    }

    /// Every key of the section, in declaration order.
    pub fn keys(self) -> impl Iterator<Item = FeatureKey> {
        (0..self.def().keys.len()).map(move |i| FeatureKey {
            section: self,
            index: i as u16,
        })
    }

    pub fn keys_with_role(self, role: Role) -> impl Iterator<Item = FeatureKey> {
        self.keys().filter(move |k| k.role() == role)
    }

    pub fn key(self, name: &str) -> Option<FeatureKey> {
        self.def()
            .keys
            .iter()
            .position(|def| def.name == name)
            .map(|i| FeatureKey {
                section: self,
                index: i as u16,
            })
    }

    pub fn main_picture(self) -> Option<FeatureKey> {
        self.key(self.def().main_picture)
    }

    pub fn main_position(self) -> Option<FeatureKey> {
        self.key(self.def().main_position)
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

impl FromStr for Section {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|sec| sec.title().eq_ignore_ascii_case(s) || sec.prefix().eq_ignore_ascii_case(s))
            .ok_or(())
    }
}

/// Handle to one entry of the static taxonomy.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FeatureKey {
    section: Section,
    index: u16,
}

impl FeatureKey {
    /// Finds a key by its unique name across all sections.
    pub fn lookup(name: &str) -> Option<Self> {
        static BY_NAME: OnceLock<FxHashMap<&'static str, FeatureKey>> = OnceLock::new();
        BY_NAME
            .get_or_init(|| {
                Section::ALL
                    .into_iter()
                    .flat_map(Section::keys)
                    .map(|key| (key.name(), key))
                    .collect()
            })
            .get(name)
            .copied()
    }

    #[inline(always)]
    fn def(self) -> &'static KeyDef {
        &self.section.def().keys[self.index as usize]
    }

    #[inline(always)]
    pub fn section(self) -> Section {
        self.section
    }

    #[inline(always)]
    pub fn name(self) -> &'static str {
        self.def().name
    }

    #[inline(always)]
    pub fn role(self) -> Role {
        self.def().role
    }

    #[inline(always)]
    pub fn prefix(self) -> &'static str {
        self.section.prefix()
    }

    pub fn main_picture(self) -> Option<Self> {
        self.section.main_picture()
    }

    pub fn main_position(self) -> Option<Self> {
        self.section.main_position()
    }

    /// Position box this key hangs off (pictures, splits and offsets only).
    pub fn position(self) -> Option<Self> {
        self.links().owner
    }

    pub fn pictures(self) -> &'static [Self] {
        &self.links().pictures
    }

    pub fn offsets(self) -> &'static [Self] {
        &self.links().offsets
    }

    pub fn split_x(self) -> Option<Self> {
        self.links().split[0]
    }

    pub fn split_y(self) -> Option<Self> {
        self.links().split[1]
    }

    /// Display label: the name without the section prefix and without a
    /// trailing `Text`.
    pub fn label(self) -> &'static str {
        let bare = self.name().strip_prefix(self.prefix()).unwrap_or(self.name());
        match bare.strip_suffix("Text") {
            Some(stripped) if !stripped.is_empty() => stripped,
            _ => bare,
        }
    }

    fn links(self) -> &'static Links {
        &link_table()[self.section as usize][self.index as usize]
    }
}

impl fmt::Debug for FeatureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name(), self.role())
    }
}

impl fmt::Display for FeatureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for FeatureKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

// --- Association table ---

#[derive(Debug, Default)]
struct Links {
    owner: Option<FeatureKey>,
    pictures: SmallVec<[FeatureKey; 4]>,
    offsets: SmallVec<[FeatureKey; 2]>,
    split: [Option<FeatureKey>; 2],
}

fn link_table() -> &'static [Vec<Links>] {
    static TABLE: OnceLock<Vec<Vec<Links>>> = OnceLock::new();
    TABLE.get_or_init(|| Section::ALL.into_iter().map(build_links).collect())
}

fn build_links(section: Section) -> Vec<Links> {
    let mut links: Vec<Links> = section.keys().map(|_| Links::default()).collect();
    let positions: Vec<FeatureKey> = section.keys_with_role(Role::PicturePosition).collect();

    for key in section.keys() {
        let name = key.name();
        // Longest matching position wins so `GmapTabsScrUpPicDn` never binds
        // to `GmapTabs`.
        let owner = positions
            .iter()
            .copied()
            .filter(|pos| {
                name.len() > pos.name().len() && name.starts_with(pos.name()) && {
                    let rest = &name[pos.name().len()..];
                    match key.role() {
                        Role::Picture => rest.starts_with("Pic"),
                        Role::Offset => rest.starts_with("Offs"),
                        Role::Value => rest == "StepX" || rest == "StepY",
                        _ => false,
                    }
                }
            })
            .max_by_key(|pos| pos.name().len());
        let Some(owner) = owner else {
            continue;
        };

        links[key.index as usize].owner = Some(owner);
        let slot = &mut links[owner.index as usize];
        match key.role() {
            Role::Picture => slot.pictures.push(key),
            Role::Offset => slot.offsets.push(key),
            Role::Value if name.ends_with("StepX") => slot.split[0] = Some(key),
            Role::Value => slot.split[1] = Some(key),
            _ => {}
        }
    }
    links
}
