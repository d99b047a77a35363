//! Flat key/value dump of an interface: a `[Common]` group and one
//! `[Resolution WxH]` group per override map.

use super::error::LoadError;
use super::key::{FeatureKey, Section};
use super::map::{FeatureMap, Interface, Resolution};
use crate::config::{IniLine, ini_lines};
use log::{debug, warn};
use rustc_hash::FxHashSet;
use std::path::Path;

pub const COMMON_GROUP: &str = "Common";
pub const RESOLUTION_GROUP: &str = "Resolution";

pub fn read_dump<P: AsRef<Path>>(path: P) -> Result<(Interface, Vec<LoadError>), String> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read interface dump '{}': {e}", path.display()))?;
    Ok(read_dump_str(&content))
}

/// Loads every well-formed entry; the rest come back as errors. A key
/// repeated within one group keeps its first value.
pub fn read_dump_str(content: &str) -> (Interface, Vec<LoadError>) {
    let mut iface = Interface::default();
    let mut errors = Vec::new();

    for (group, pairs) in group_lines(content) {
        if group.is_empty() || group.eq_ignore_ascii_case(COMMON_GROUP) {
            load_pairs(group, &pairs, &mut iface.common, &mut errors);
            continue;
        }
        let resolution = match strip_prefix_ignore_case(group, RESOLUTION_GROUP) {
            Some(rest) => rest.parse::<Resolution>(),
            None => Err(format!("expected [{COMMON_GROUP}] or [{RESOLUTION_GROUP} WxH]")),
        };
        match resolution {
            Ok(res) => {
                let map = iface.override_map_mut(res);
                load_pairs(group, &pairs, map, &mut errors);
            }
            Err(reason) => {
                warn!("Skipping interface group [{group}]: {reason}");
                errors.push(LoadError::BadGroup {
                    group: group.to_string(),
                    reason,
                });
            }
        }
    }

    debug!(
        "Interface dump: {} common entries, {} resolution override(s), {} error(s)",
        iface.common.len(),
        iface.overrides().len(),
        errors.len()
    );
    (iface, errors)
}

/// Pairs per group in file order; repeated headers extend the earlier group.
fn group_lines(content: &str) -> Vec<(&str, Vec<(&str, &str)>)> {
    let mut groups: Vec<(&str, Vec<(&str, &str)>)> = Vec::new();
    let mut current = None;
    for line in ini_lines(content) {
        match line {
            IniLine::Section(name) => {
                let idx = match groups.iter().position(|(g, _)| g.eq_ignore_ascii_case(name)) {
                    Some(idx) => idx,
                    None => {
                        groups.push((name, Vec::new()));
                        groups.len() - 1
                    }
                };
                current = Some(idx);
            }
            IniLine::Pair(key, value) => {
                let idx = match current {
                    Some(idx) => idx,
                    None => {
                        groups.push(("", Vec::new()));
                        let idx = groups.len() - 1;
                        current = Some(idx);
                        idx
                    }
                };
                groups[idx].1.push((key, value));
            }
        }
    }
    groups
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &text[prefix.len()..])
}

fn load_pairs(
    group: &str,
    pairs: &[(&str, &str)],
    map: &mut FeatureMap,
    errors: &mut Vec<LoadError>,
) {
    let mut seen = FxHashSet::default();
    for &(name, text) in pairs {
        if !seen.insert(name) {
            warn!("[{group}] {name} is defined more than once, keeping the first value");
            errors.push(LoadError::DuplicateKey {
                group: group.to_string(),
                key: name.to_string(),
            });
            continue;
        }
        let Some(key) = FeatureKey::lookup(name) else {
            warn!("[{group}] unknown feature key '{name}'");
            errors.push(LoadError::UnknownKey {
                group: group.to_string(),
                key: name.to_string(),
            });
            continue;
        };
        if let Err(source) = map.set_text(key, text) {
            warn!("[{group}] {name}: {source}");
            errors.push(LoadError::BadValue {
                group: group.to_string(),
                key: name.to_string(),
                source,
            });
        }
    }
}

/// Canonical dump: groups in resolution order, keys in taxonomy order.
pub fn write_dump(iface: &Interface) -> String {
    let mut out = String::new();
    write_group(&mut out, COMMON_GROUP, &iface.common);
    for ov in iface.overrides() {
        out.push('\n');
        write_group(
            &mut out,
            &format!("{RESOLUTION_GROUP} {}", ov.resolution),
            &ov.map,
        );
    }
    out
}

fn write_group(out: &mut String, header: &str, map: &FeatureMap) {
    out.push_str(&format!("[{header}]\n"));
    let mut last_section: Option<Section> = None;
    for (key, value) in map.iter_sorted() {
        if last_section.is_some_and(|s| s != key.section()) {
            out.push('\n');
        }
        last_section = Some(key.section());
        out.push_str(&format!("{}={}\n", key.name(), value.serialize()));
    }
}

#[cfg(test)]
mod tests {
    use super::{read_dump_str, write_dump};
    use crate::iface::error::LoadError;
    use crate::iface::key::FeatureKey;
    use crate::iface::map::Resolution;
    use crate::iface::value::{FeatureValue, Rect4};

    const DUMP: &str = "\
[Common]
LogMainPic=art\\intrface\\login.png
LogExit=10 10 110 40
LogExitText=10 45 110 60
IntApStepX=9
GmapWMapOffs=0.5 0.5 2.0 2.0
LogBogus=1
LogPlay=1 2 three 4

[Resolution 1024x768]
LogExit=20 20 140 50

[Widescreen]
LogExit=0 0 0 0
";

    fn key(name: &str) -> FeatureKey {
        FeatureKey::lookup(name).unwrap()
    }

    #[test]
    fn loads_groups_and_reports_bad_entries_individually() {
        let (iface, errors) = read_dump_str(DUMP);
        assert_eq!(
            iface.common.get(key("LogExit")),
            Some(&FeatureValue::Rect4(Rect4::new(10, 10, 110, 40)))
        );
        assert_eq!(
            iface.common.get(key("LogMainPic")),
            Some(&FeatureValue::Image("art\\intrface\\login.png".into()))
        );
        assert_eq!(iface.common.get(key("IntApStepX")), Some(&FeatureValue::Single(9)));
        assert_eq!(
            iface.common.get(key("GmapWMapOffs")),
            Some(&FeatureValue::Vector4([0.5, 0.5, 2.0, 2.0]))
        );
        let over = iface
            .override_map(Resolution::new(1024, 768))
            .expect("override group");
        assert_eq!(over.len(), 1);

        assert_eq!(errors.len(), 3, "{errors:?}");
        assert!(errors.iter().any(|e| matches!(e, LoadError::UnknownKey { key, .. } if key == "LogBogus")));
        assert!(errors.iter().any(|e| matches!(e, LoadError::BadValue { key, .. } if key == "LogPlay")));
        assert!(errors.iter().any(|e| matches!(e, LoadError::BadGroup { group, .. } if group == "Widescreen")));
    }

    #[test]
    fn repeated_keys_keep_the_first_value_and_are_reported() {
        let (iface, errors) =
            read_dump_str("[Common]\nLogExit=1 1 2 2\nLogExit=3 3 4 4\n[Common]\nLogExit=5 5 6 6\n");
        assert_eq!(
            iface.common.get(key("LogExit")),
            Some(&FeatureValue::Rect4(Rect4::new(1, 1, 2, 2)))
        );
        assert_eq!(
            errors,
            [
                LoadError::DuplicateKey {
                    group: "Common".into(),
                    key: "LogExit".into()
                },
                LoadError::DuplicateKey {
                    group: "Common".into(),
                    key: "LogExit".into()
                },
            ]
        );
    }

    #[test]
    fn group_names_match_without_case() {
        let (iface, errors) =
            read_dump_str("[common]\nLogExit=1 1 2 2\n[resolution 1024x768]\nLogExit=3 3 4 4\n");
        assert!(errors.is_empty(), "{errors:?}");
        assert_eq!(iface.common.len(), 1);
        assert!(iface.override_map(Resolution::new(1024, 768)).is_some());
    }

    #[test]
    fn written_dump_reads_back_identically() {
        let (iface, _) = read_dump_str(DUMP);
        let text = write_dump(&iface);
        let (again, errors) = read_dump_str(&text);
        assert!(errors.is_empty(), "{errors:?}");
        assert_eq!(again, iface);
        assert!(text.contains("[Resolution 1024x768]\nLogExit=20 20 140 50\n"), "{text}");
    }
}
