use crate::assets::{FileImageSource, ImageCache};
use crate::config;
use crate::iface::dump::{read_dump, write_dump};
use crate::iface::key::{FeatureKey, Role, Section};
use crate::iface::map::{Interface, Resolution, Target};
use crate::ui::actors::{Component, ComponentKind};
use crate::ui::compose::build_interface;
use clap::{Parser, Subcommand};
use log::{info, warn};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "fo-iface", about = "Resolve and lay out game interface sections")]
pub struct Cli {
    /// Directory picture paths are relative to (overrides ArtDir)
    #[arg(long, global = true)]
    pub art_dir: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build one section and print its components
    Build {
        /// Interface dump ([Common] / [Resolution WxH] groups)
        dump: PathBuf,
        #[arg(short, long)]
        section: String,
        /// Target resolution, e.g. 1024x768; omit for all-resolutions mode
        #[arg(short, long)]
        resolution: Option<String>,
        /// Print the layout as JSON
        #[arg(long)]
        json: bool,
        /// Also report where split components sit after this many seconds
        #[arg(long)]
        time: Option<f32>,
    },
    /// List the feature keys of a section
    Keys { section: String },
    /// Load a dump and report every entry that fails to load
    Check { dump: PathBuf },
    /// Set one feature value and rewrite the dump
    Set {
        dump: PathBuf,
        key: String,
        value: String,
        /// Write into this resolution's overrides instead of the common map
        #[arg(short, long)]
        resolution: Option<String>,
        /// Rewrite even if some entries failed to load (they are dropped)
        #[arg(long)]
        force: bool,
    },
    /// Drop a resolution override so the key inherits from the common map
    Revert {
        dump: PathBuf,
        key: String,
        #[arg(short, long)]
        resolution: String,
        /// Rewrite even if some entries failed to load (they are dropped)
        #[arg(long)]
        force: bool,
    },
}

fn parse_section(name: &str) -> Result<Section, String> {
    name.parse::<Section>().map_err(|()| {
        let known: Vec<&str> = Section::ALL.iter().map(|s| s.title()).collect();
        format!("unknown section '{name}' (known: {})", known.join(", "))
    })
}

fn parse_key(name: &str) -> Result<FeatureKey, String> {
    FeatureKey::lookup(name).ok_or_else(|| format!("unknown feature key '{name}'"))
}

/// Loads a dump that is about to be rewritten. Entries that failed to load
/// would not survive the rewrite, so they block it unless `force` is set.
fn load_for_rewrite(dump: &Path, force: bool) -> Result<Interface, String> {
    let (iface, errors) = read_dump(dump)?;
    if errors.is_empty() {
        return Ok(iface);
    }
    if !force {
        return Err(format!(
            "'{}' has {} entr(ies) that failed to load and would be dropped by a rewrite; fix them or pass --force",
            dump.display(),
            errors.len()
        ));
    }
    warn!(
        "Dropping {} unloadable entr(ies) from '{}'",
        errors.len(),
        dump.display()
    );
    Ok(iface)
}

fn save_dump(dump: &Path, iface: &Interface) -> Result<(), String> {
    std::fs::write(dump, write_dump(iface))
        .map_err(|e| format!("failed to write interface dump '{}': {e}", dump.display()))
}

pub fn cmd_build(
    dump: &Path,
    section: &str,
    resolution: Option<&str>,
    json: bool,
    time: Option<f32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let section = parse_section(section)?;
    let target = match resolution {
        Some(r) => Target::Resolution(r.parse::<Resolution>()?),
        None => Target::Design,
    };
    let (iface, errors) = read_dump(dump)?;
    if !errors.is_empty() {
        info!("{} entr(ies) in '{}' failed to load", errors.len(), dump.display());
    }

    let cfg = config::get();
    let images = ImageCache::new(FileImageSource::new(&cfg.art_dir));
    let layout = build_interface(&iface, section, target, &images, &cfg.build_options())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&layout)?);
        return Ok(());
    }

    println!(
        "{} @ {}: design {}x{}, scale {:.3} x {:.3}",
        layout.section,
        layout.target,
        layout.design_size[0],
        layout.design_size[1],
        layout.scale.x,
        layout.scale.y
    );
    for component in &layout.components {
        println!("  {}", describe(component, time));
    }
    Ok(())
}

fn describe(c: &Component, time: Option<f32>) -> String {
    let head = format!("{:<20} {:<8}", c.key.name(), format!("{:?}", c.inheritance));
    let [x, y] = c.pos();
    match &c.kind {
        ComponentKind::Quad { size, texture, .. } => {
            format!("{head} quad      ({x:.1}, {y:.1}) {:.1}x{:.1} {texture}", size[0], size[1])
        }
        ComponentKind::Animation { size, frames, fps, .. } => format!(
            "{head} animation ({x:.1}, {y:.1}) {:.1}x{:.1} {} frame(s) @ {fps:.1} fps",
            size[0],
            size[1],
            frames.len()
        ),
        ComponentKind::Addressable(q) => {
            let mut line = format!(
                "{head} split     ({x:.1}, {y:.1}) {:.1}x{:.1} step ({:.1}, {:.1}) {} cell(s) {}",
                q.size[0],
                q.size[1],
                q.step[0],
                q.step[1],
                q.period(),
                q.texture
            );
            if let Some(t) = time {
                let [px, py] = q.position_at_time(t);
                line.push_str(&format!(" -> ({px:.1}, {py:.1}) at {t}s"));
            }
            line
        }
        ComponentKind::Text { content, scale, .. } => {
            format!("{head} text      ({x:.1}, {y:.1}) \"{content}\" x{scale:.2}")
        }
        ComponentKind::Primitive { size, .. } => {
            format!("{head} outline   ({x:.1}, {y:.1}) {:.1}x{:.1}", size[0], size[1])
        }
    }
}

pub fn cmd_keys(section: &str) -> Result<(), Box<dyn std::error::Error>> {
    let section = parse_section(section)?;
    println!("{} (prefix {})", section, section.prefix());
    for key in section.keys() {
        println!("{}", key_line(key));
    }
    Ok(())
}

fn key_line(key: FeatureKey) -> String {
    let mut line = format!("  {:<20} {}", key.name(), key.role());
    if key.role() != Role::PicturePosition {
        return line;
    }
    let names = |keys: &[FeatureKey]| keys.iter().map(|k| k.name()).collect::<Vec<_>>().join(", ");
    if !key.pictures().is_empty() {
        line.push_str(&format!("  pictures: {}", names(key.pictures())));
    }
    if !key.offsets().is_empty() {
        line.push_str(&format!("  offsets: {}", names(key.offsets())));
    }
    let splits: Vec<FeatureKey> = [key.split_x(), key.split_y()].into_iter().flatten().collect();
    if !splits.is_empty() {
        line.push_str(&format!("  splits: {}", names(&splits)));
    }
    line
}

/// Returns whether the dump loaded cleanly.
pub fn cmd_check(dump: &Path) -> Result<bool, Box<dyn std::error::Error>> {
    let (iface, errors) = read_dump(dump)?;
    println!(
        "{}: {} common entr(ies), {} resolution override(s)",
        dump.display(),
        iface.common.len(),
        iface.overrides().len()
    );
    for res in iface.resolutions() {
        let count = iface.override_map(res).map_or(0, |m| m.len());
        println!("  {res}: {count} override(s)");
    }
    for e in &errors {
        println!("  error: {e}");
    }
    Ok(errors.is_empty())
}

pub fn cmd_set(
    dump: &Path,
    key: &str,
    value: &str,
    resolution: Option<&str>,
    force: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let key = parse_key(key)?;
    let target = match resolution {
        Some(r) => Target::Resolution(r.parse::<Resolution>()?),
        None => Target::Design,
    };
    let value = key.role().parse_value(value)?;
    let mut iface = load_for_rewrite(dump, force)?;
    let inheritance = iface.apply_edit(key, value, target)?;
    save_dump(dump, &iface)?;
    println!("{key} set for {target} ({inheritance:?})");
    Ok(())
}

pub fn cmd_revert(
    dump: &Path,
    key: &str,
    resolution: &str,
    force: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let key = parse_key(key)?;
    let resolution = resolution.parse::<Resolution>()?;
    let mut iface = load_for_rewrite(dump, force)?;
    match iface.revert(key, resolution) {
        Some(old) => {
            save_dump(dump, &iface)?;
            println!("{key} at {resolution} reverted (was {old})");
        }
        None => println!("{key} has no override at {resolution}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{cmd_check, cmd_revert, cmd_set, key_line};
    use crate::iface::key::FeatureKey;
    use std::path::{Path, PathBuf};

    const CLEAN: &str = "\
[Common]
LogExit=10 10 110 40

[Resolution 1024x768]
LogExit=20 20 140 50
";

    const BROKEN: &str = "\
[Common]
LogExit=10 10 110 40
LogPlay=1 2 three 4
LogBogus=5

[Resolution 1024x768]
LogExit=20 20 140 50
";

    fn temp_dump(name: &str, content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("fo-iface-cli-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("temp dir");
        let path = dir.join(name);
        std::fs::write(&path, content).expect("write dump");
        path
    }

    fn read(path: &Path) -> String {
        std::fs::read_to_string(path).expect("read dump")
    }

    #[test]
    fn set_and_revert_rewrite_a_clean_dump() {
        let path = temp_dump("clean.ini", CLEAN);
        cmd_set(&path, "LogExit", "0 0 5 5", None, false).expect("set common");
        assert!(read(&path).contains("[Common]\nLogExit=0 0 5 5\n"), "{}", read(&path));

        cmd_revert(&path, "LogExit", "1024x768", false).expect("revert override");
        let text = read(&path);
        assert!(!text.contains("Resolution"), "empty override group is dropped: {text}");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn rewrites_refuse_to_drop_unloadable_entries() {
        let path = temp_dump("broken.ini", BROKEN);
        assert!(cmd_set(&path, "LogExit", "0 0 5 5", None, false).is_err());
        assert!(cmd_revert(&path, "LogExit", "1024x768", false).is_err());
        assert_eq!(read(&path), BROKEN, "file must be left untouched");

        cmd_set(&path, "LogExit", "0 0 5 5", None, true).expect("forced set");
        let text = read(&path);
        assert!(text.contains("LogExit=0 0 5 5"), "{text}");
        assert!(!text.contains("LogBogus"), "forced rewrite drops what it could not load");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn set_rejects_values_the_key_cannot_hold() {
        let path = temp_dump("badvalue.ini", CLEAN);
        assert!(cmd_set(&path, "LogExit", "1 2 3", None, false).is_err());
        assert!(cmd_set(&path, "NoSuchKey", "1", None, false).is_err());
        assert_eq!(read(&path), CLEAN);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn check_reports_whether_the_dump_loaded_cleanly() {
        let clean = temp_dump("check-clean.ini", CLEAN);
        let broken = temp_dump("check-broken.ini", BROKEN);
        assert!(cmd_check(&clean).expect("readable"));
        assert!(!cmd_check(&broken).expect("readable"));
        assert!(cmd_check(&clean.with_file_name("missing.ini")).is_err());
        let _ = std::fs::remove_file(&clean);
        let _ = std::fs::remove_file(&broken);
    }

    #[test]
    fn key_listing_names_linked_keys() {
        let item = key_line(FeatureKey::lookup("IntItem").expect("IntItem"));
        assert!(item.contains("offsets: IntItemOffsX, IntItemOffsY"), "{item}");
        let ap = key_line(FeatureKey::lookup("IntAp").expect("IntAp"));
        assert!(ap.contains("pictures: IntApPic"), "{ap}");
        assert!(ap.contains("splits: IntApStepX"), "{ap}");
    }
}
