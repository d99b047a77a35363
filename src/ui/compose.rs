use crate::assets::{ImageInfo, ImageSource};
use crate::iface::error::BuildError;
use crate::iface::key::{FeatureKey, Role, Section};
use crate::iface::map::{Inheritance, Interface, Resolver, Target};
use crate::iface::scale::{DEFAULT_DESIGN_SIZE, Scale, ScaledRect};
use crate::ui::actors::{AddressableQuad, Component, ComponentKind, PLACEHOLDER_TEXTURE};
use crate::ui::color;
use log::{debug, info, warn};
use serde::Serialize;
use std::sync::Arc;

/// Font cell at design resolution, in pixels.
pub const DEFAULT_FONT_CELL: [f32; 2] = [8.0, 12.0];

/// Weight of the box extent when blending glyph size toward box size.
const TEXT_BOX_BLEND: f32 = 0.35;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuildOptions {
    pub design_fallback: [u32; 2],
    pub font_cell: [f32; 2],
    pub address_steps_per_second: f32,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            design_fallback: DEFAULT_DESIGN_SIZE,
            font_cell: DEFAULT_FONT_CELL,
            address_steps_per_second: 4.0,
        }
    }
}

/// Result of one (section, target) build.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub section: Section,
    pub target: Target,
    pub design_size: [u32; 2],
    pub target_size: [u32; 2],
    pub scale: Scale,
    pub components: Vec<Component>,
}

/* ============================ LAYOUT BUILDER ============================ */

pub fn build_interface(
    iface: &Interface,
    section: Section,
    target: Target,
    images: &dyn ImageSource,
    opts: &BuildOptions,
) -> Result<Layout, BuildError> {
    build_layout(section, &iface.resolver(target), target, images, opts)
}

/// Builds the component list of `section`: the root picture, then every
/// positioned picture, then every text box followed by its outline, each in
/// taxonomy order.
pub fn build_layout(
    section: Section,
    resolver: &Resolver<'_>,
    target: Target,
    images: &dyn ImageSource,
    opts: &BuildOptions,
) -> Result<Layout, BuildError> {
    let def = section.def();
    if def.keys.is_empty() {
        return Err(BuildError::EmptyTaxonomy(section));
    }
    let main_picture = section.main_picture().ok_or(BuildError::MissingMainKey {
        section,
        key: def.main_picture,
    })?;
    let main_position = section.main_position().ok_or(BuildError::MissingMainKey {
        section,
        key: def.main_position,
    })?;

    let target_size = match target {
        Target::Design => opts.design_fallback,
        Target::Resolution(res) => res.dims(),
    };

    let mut components = Vec::with_capacity(def.keys.len() + 1);

    // Root first: its natural size fixes the scale for everything else.
    let (root_image, root_inheritance) = match resolver.image(main_picture) {
        Some((path, inheritance)) => (load_image(images, main_picture, path), inheritance),
        None => (None, Inheritance::Unset),
    };
    let design_size = match &root_image {
        Some(info) if info.width > 0 && info.height > 0 => [info.width, info.height],
        _ => opts.design_fallback,
    };
    let scale = Scale::between(design_size, target_size);
    info!(
        "Building {section} for {target}: design {}x{}, target {}x{}, scale {:.3}x{:.3}",
        design_size[0], design_size[1], target_size[0], target_size[1], scale.x, scale.y
    );

    let root_size = scale.size(design_size[0], design_size[1]);
    let (texture, tint) = match &root_image {
        Some(info) => (info.first_frame().to_string(), color::WHITE),
        None => (PLACEHOLDER_TEXTURE.to_string(), color::PLACEHOLDER_ROOT_RGBA),
    };
    components.push(Component::new(
        main_picture,
        root_inheritance,
        ComponentKind::Quad {
            pos: [root_size[0] * 0.5, root_size[1] * 0.5],
            size: root_size,
            texture,
            tint,
        },
    ));

    let origin = if section.relative_to_main() {
        resolver
            .rect(main_position)
            .map_or([0.0, 0.0], |(rect, _)| scale.rect(rect).min)
    } else {
        [0.0, 0.0]
    };

    for key in section.keys_with_role(Role::PicturePosition) {
        if key == main_position {
            continue;
        }
        let Some((rect, inheritance)) = resolver.rect(key) else {
            continue;
        };
        let area = scale.rect(rect).translate(origin);
        let split = split_of(resolver, key);
        let picture = first_picture(resolver, images, key);
        if picture.is_none() {
            debug!("{key}: no picture resolved, emitting placeholder");
        }
        let kind = picture_kind(area, split, picture.as_deref(), scale, opts);
        components.push(Component::new(key, inheritance, kind));
    }

    for key in section.keys_with_role(Role::Text) {
        let Some((rect, inheritance)) = resolver.rect(key) else {
            continue;
        };
        let area = scale.rect(rect).translate(origin);
        let (text, outline) = text_kinds(key, area, scale, opts);
        components.push(Component::new(key, inheritance, text));
        components.push(Component::new(key, inheritance, outline));
    }

    debug!("{section}: {} component(s)", components.len());
    Ok(Layout {
        section,
        target,
        design_size,
        target_size,
        scale,
        components,
    })
}

/* ============================ PICTURE RULES ============================ */

fn load_image(images: &dyn ImageSource, key: FeatureKey, path: &str) -> Option<Arc<ImageInfo>> {
    match images.load(path) {
        Ok(info) => Some(info),
        Err(e) => {
            warn!("{key}: failed to load picture '{path}': {e}");
            None
        }
    }
}

/// Split width/height of a position key; zero when unset.
fn split_of(resolver: &Resolver<'_>, key: FeatureKey) -> [i32; 2] {
    let read = |k: Option<FeatureKey>| k.and_then(|k| resolver.int(k)).map_or(0, |(v, _)| v);
    [read(key.split_x()), read(key.split_y())]
}

/// First associated picture, in declaration order, that resolves and loads.
fn first_picture(
    resolver: &Resolver<'_>,
    images: &dyn ImageSource,
    key: FeatureKey,
) -> Option<Arc<ImageInfo>> {
    key.pictures().iter().find_map(|&pic| {
        let (path, _) = resolver.image(pic)?;
        load_image(images, pic, path)
    })
}

fn picture_kind(
    area: ScaledRect,
    split: [i32; 2],
    picture: Option<&ImageInfo>,
    scale: Scale,
    opts: &BuildOptions,
) -> ComponentKind {
    if split != [0, 0] {
        let step = scale.point([split[0] as f32, split[1] as f32]);
        let extent = area.size();
        let (size, texture, tint) = match picture {
            Some(info) => (
                scale.size(info.width, info.height),
                info.first_frame().to_string(),
                color::WHITE,
            ),
            None => {
                let axis = |i: usize| {
                    if split[i] != 0 {
                        step[i].abs()
                    } else {
                        extent[i]
                    }
                };
                (
                    [axis(0), axis(1)],
                    PLACEHOLDER_TEXTURE.to_string(),
                    color::PLACEHOLDER_SPLIT_RGBA,
                )
            }
        };
        return ComponentKind::Addressable(AddressableQuad {
            pos: area.min,
            size,
            max_pos: area.max,
            step,
            texture,
            tint,
            steps_per_second: opts.address_steps_per_second,
        });
    }

    let Some(info) = picture else {
        return ComponentKind::Quad {
            pos: area.center(),
            size: area.size(),
            texture: PLACEHOLDER_TEXTURE.to_string(),
            tint: color::PLACEHOLDER_RGBA,
        };
    };
    let size = scale.size(info.width, info.height);
    let pos = [area.min[0] + size[0] * 0.5, area.min[1] + size[1] * 0.5];
    if info.is_animated() {
        ComponentKind::Animation {
            pos,
            size,
            frames: info.frames.clone(),
            fps: info.fps,
        }
    } else {
        ComponentKind::Quad {
            pos,
            size,
            texture: info.first_frame().to_string(),
            tint: color::WHITE,
        }
    }
}

/* ============================== TEXT RULES ============================== */

#[inline(always)]
fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    (b - a).mul_add(t, a)
}

/// Uniform glyph scale for `chars` characters of `cell` inside `area`: each
/// axis blends the glyph run toward the box extent, the tighter axis wins.
fn text_scale(cell: [f32; 2], area: [f32; 2], chars: usize) -> f32 {
    let glyph = [cell[0] * chars.max(1) as f32, cell[1]];
    let axis = |i: usize| {
        if glyph[i] <= f32::EPSILON {
            return 1.0;
        }
        lerp_f32(glyph[i], area[i].abs(), TEXT_BOX_BLEND) / glyph[i]
    };
    axis(0).min(axis(1))
}

fn text_kinds(
    key: FeatureKey,
    area: ScaledRect,
    scale: Scale,
    opts: &BuildOptions,
) -> (ComponentKind, ComponentKind) {
    let content = key.label().to_string();
    let cell = scale.point(opts.font_cell);
    let size = area.size();
    let text = ComponentKind::Text {
        pos: area.center(),
        scale: text_scale(cell, size, content.chars().count()),
        content,
        cell,
    };
    let outline = ComponentKind::Primitive {
        pos: area.center(),
        size,
        color: color::TEXT_BOX_RGBA,
    };
    (text, outline)
}

#[cfg(test)]
mod tests {
    use super::{BuildOptions, Layout, build_interface, text_scale};
    use crate::assets::DecodedImages;
    use crate::iface::error::BuildError;
    use crate::iface::key::{FeatureKey, Section};
    use crate::iface::map::{Inheritance, Interface, Resolution, Target};
    use crate::iface::value::{FeatureValue, Rect4};
    use crate::ui::actors::{Component, ComponentKind};

    const XGA: Target = Target::Resolution(Resolution::new(1024, 768));

    fn key(name: &str) -> FeatureKey {
        FeatureKey::lookup(name).unwrap_or_else(|| panic!("unknown key {name}"))
    }

    fn rect(a: i32, b: i32, c: i32, d: i32) -> FeatureValue {
        FeatureValue::Rect4(Rect4::new(a, b, c, d))
    }

    fn image(path: &str) -> FeatureValue {
        FeatureValue::Image(path.to_string())
    }

    fn close(a: [f32; 2], b: [f32; 2]) -> bool {
        (a[0] - b[0]).abs() <= 1e-3 && (a[1] - b[1]).abs() <= 1e-3
    }

    fn login() -> (Interface, DecodedImages) {
        let mut iface = Interface::default();
        iface.common.insert(key("LogMainPic"), image("login.png"));
        iface.common.insert(key("LogExit"), rect(10, 10, 110, 40));
        iface.common.insert(key("LogExitPicDn"), image("exit_dn.png"));
        iface.common.insert(key("LogPlay"), rect(200, 100, 300, 150));
        iface.common.insert(key("LogExitText"), rect(0, 0, 100, 20));
        let mut images = DecodedImages::new();
        images.insert_still("login.png", 800, 600);
        images.insert_still("exit_dn.png", 100, 30);
        (iface, images)
    }

    fn build(iface: &Interface, images: &DecodedImages, section: Section, target: Target) -> Layout {
        build_interface(iface, section, target, images, &BuildOptions::default())
            .expect("build succeeds")
    }

    fn only<'a>(layout: &'a Layout, name: &str) -> &'a Component {
        let mut hits = layout.components.iter().filter(|c| c.key == key(name));
        let first = hits.next().unwrap_or_else(|| panic!("{name} not emitted"));
        assert!(hits.next().is_none(), "{name} emitted more than once");
        first
    }

    #[test]
    fn login_root_and_button_scale_to_xga() {
        let (iface, images) = login();
        let layout = build(&iface, &images, Section::Login, XGA);
        assert_eq!(layout.design_size, [800, 600]);
        assert!((layout.scale.x - 1.28).abs() < 1e-5 && (layout.scale.y - 1.28).abs() < 1e-5);

        let root = &layout.components[0];
        assert_eq!(root.key, key("LogMainPic"));
        match &root.kind {
            ComponentKind::Quad { pos, size, texture, .. } => {
                assert!(close(*size, [1024.0, 768.0]), "root size {size:?}");
                assert!(close(*pos, [512.0, 384.0]), "root centered, got {pos:?}");
                assert_eq!(texture, "login.png");
            }
            other => panic!("root should be a quad, got {other:?}"),
        }

        let exit = only(&layout, "LogExit");
        assert_eq!(exit.inheritance, Inheritance::Base);
        assert!(exit.enabled);
        match &exit.kind {
            ComponentKind::Quad { pos, size, texture, .. } => {
                assert!(close(*size, [128.0, 38.4]), "image size scales, got {size:?}");
                assert!(close(*pos, [12.8 + 64.0, 12.8 + 19.2]), "got {pos:?}");
                assert_eq!(texture, "exit_dn.png");
            }
            other => panic!("LogExit should be a quad, got {other:?}"),
        }
    }

    #[test]
    fn identity_scale_keeps_input_geometry() {
        let (iface, images) = login();
        let layout = build(&iface, &images, Section::Login, Target::Design);
        assert_eq!((layout.scale.x, layout.scale.y), (1.0, 1.0));
        match &only(&layout, "LogPlay").kind {
            ComponentKind::Quad { pos, size, .. } => {
                assert_eq!(*size, [100.0, 50.0]);
                assert_eq!(*pos, [250.0, 125.0]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn missing_picture_yields_exactly_one_placeholder_sized_to_rect() {
        let (mut iface, images) = login();
        iface.common.insert(key("LogReg"), rect(0, 0, 40, 20));
        iface.common.insert(key("LogRegPicDn"), image("not_decoded.png"));
        let layout = build(&iface, &images, Section::Login, XGA);
        for name in ["LogPlay", "LogReg"] {
            let c = only(&layout, name);
            assert!(c.is_placeholder(), "{name} should be a placeholder");
            assert!(matches!(c.kind, ComponentKind::Quad { .. }));
        }
        assert!(close(only(&layout, "LogReg").size().unwrap(), [51.2, 25.6]));
    }

    #[test]
    fn wrong_variant_on_picture_key_falls_back_to_placeholder() {
        let (mut iface, images) = login();
        iface.common.insert(key("LogExitPicDn"), rect(1, 1, 2, 2));
        let layout = build(&iface, &images, Section::Login, XGA);
        assert!(only(&layout, "LogExit").is_placeholder());
    }

    #[test]
    fn later_pictures_stand_in_for_unresolved_earlier_ones() {
        let mut iface = Interface::default();
        iface.common.insert(key("InvScrUp"), rect(0, 0, 20, 20));
        iface.common.insert(key("InvScrUpPicUp"), image("gone.png"));
        iface.common.insert(key("InvScrUpPicDn"), image("scr_dn.png"));
        let mut images = DecodedImages::new();
        images.insert_still("scr_dn.png", 10, 10);
        let layout = build(&iface, &images, Section::Inventory, Target::Design);
        match &only(&layout, "InvScrUp").kind {
            ComponentKind::Quad { texture, .. } => assert_eq!(texture, "scr_dn.png"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn split_always_yields_addressable_quad() {
        let mut iface = Interface::default();
        iface.common.insert(key("IntMainPic"), image("iface.png"));
        iface.common.insert(key("IntAp"), rect(0, 0, 90, 8));
        iface.common.insert(key("IntApPic"), image("ap.png"));
        iface.common.insert(key("IntApStepX"), FeatureValue::Single(9));
        iface.common.insert(key("IntAmmoCount"), rect(0, 10, 10, 70));
        iface.common.insert(key("IntAmmoCountStepY"), FeatureValue::Single(6));
        let mut images = DecodedImages::new();
        images.insert_still("iface.png", 800, 600);
        images.insert_still("ap.png", 8, 8);
        let layout = build(&iface, &images, Section::Game, Target::Design);

        let ComponentKind::Addressable(ap) = &only(&layout, "IntAp").kind else {
            panic!("IntAp should be addressable");
        };
        assert_eq!(ap.size, [8.0, 8.0]);
        assert_eq!(ap.step, [9.0, 0.0]);
        assert_eq!(ap.max_pos, [90.0, 8.0]);
        assert_eq!(ap.texture, "ap.png");
        assert_eq!(ap.period(), 10);

        let ammo = only(&layout, "IntAmmoCount");
        assert!(ammo.is_placeholder());
        let ComponentKind::Addressable(ammo) = &ammo.kind else {
            panic!("IntAmmoCount should be addressable without an image too");
        };
        assert_eq!(ammo.size, [10.0, 6.0], "split axis sized from the split value");
        assert_eq!(ammo.pos, [0.0, 10.0]);
    }

    #[test]
    fn zero_split_is_no_split() {
        let mut iface = Interface::default();
        iface.common.insert(key("IntAp"), rect(0, 0, 90, 8));
        iface.common.insert(key("IntApStepX"), FeatureValue::Single(0));
        let layout = build(&iface, &DecodedImages::new(), Section::Game, Target::Design);
        assert!(matches!(only(&layout, "IntAp").kind, ComponentKind::Quad { .. }));
    }

    #[test]
    fn multi_frame_picture_becomes_animation() {
        let mut iface = Interface::default();
        iface.common.insert(key("IntCombatTurn"), rect(10, 10, 60, 30));
        iface.common.insert(key("IntCombatTurnPic"), image("turn.gif"));
        let mut images = DecodedImages::new();
        images.insert_animation("turn.gif", 50, 20, 4, 12.0);
        let layout = build(&iface, &images, Section::Game, Target::Design);
        match &only(&layout, "IntCombatTurn").kind {
            ComponentKind::Animation { frames, fps, pos, size } => {
                assert_eq!(frames.len(), 4);
                assert_eq!(*fps, 12.0);
                assert_eq!(*size, [50.0, 20.0]);
                assert_eq!(*pos, [35.0, 20.0]);
            }
            other => panic!("expected animation, got {other:?}"),
        }
    }

    #[test]
    fn text_gets_label_and_outline_and_unset_text_is_omitted() {
        let (iface, images) = login();
        let layout = build(&iface, &images, Section::Login, Target::Design);
        let texts: Vec<_> = layout
            .components
            .iter()
            .filter(|c| c.key == key("LogExitText"))
            .collect();
        assert_eq!(texts.len(), 2, "text plus outline");
        match &texts[0].kind {
            ComponentKind::Text { pos, content, cell, scale, .. } => {
                assert_eq!(content, "Exit");
                assert_eq!(*pos, [50.0, 10.0]);
                assert_eq!(*cell, [8.0, 12.0]);
                assert!((scale - 14.8 / 12.0).abs() < 1e-5, "scale {scale}");
            }
            other => panic!("expected text, got {other:?}"),
        }
        match &texts[1].kind {
            ComponentKind::Primitive { pos, size, .. } => {
                assert_eq!(*pos, [50.0, 10.0]);
                assert_eq!(*size, [100.0, 20.0]);
            }
            other => panic!("expected outline, got {other:?}"),
        }
        assert!(
            layout.components.iter().all(|c| c.key != key("LogVersion")),
            "unset text keys are not emitted"
        );
    }

    #[test]
    fn text_scale_blends_glyphs_toward_the_box() {
        let s = text_scale([8.0, 12.0], [100.0, 20.0], 4);
        assert!((s - 14.8 / 12.0).abs() < 1e-5);
        let tight = text_scale([8.0, 12.0], [16.0, 6.0], 4);
        assert!(tight < 1.0, "small boxes shrink glyphs, got {tight}");
    }

    #[test]
    fn override_rect_is_tagged_derived() {
        let (mut iface, images) = login();
        let over = iface.override_map_mut(Resolution::new(1024, 768));
        over.insert(key("LogExit"), rect(0, 0, 100, 30));
        let layout = build(&iface, &images, Section::Login, XGA);
        assert_eq!(only(&layout, "LogExit").inheritance, Inheritance::Derived);
        assert_eq!(only(&layout, "LogPlay").inheritance, Inheritance::Base);
        let design = build(&iface, &images, Section::Login, Target::Design);
        assert_eq!(only(&design, "LogExit").inheritance, Inheritance::Base);
    }

    #[test]
    fn global_map_places_children_relative_to_main_rect() {
        let mut iface = Interface::default();
        iface.common.insert(key("GmapMain"), rect(100, 50, 740, 530));
        iface.common.insert(key("GmapTown"), rect(10, 10, 30, 30));
        iface.common.insert(key("GmapTime"), rect(0, 0, 40, 10));
        let layout = build(&iface, &DecodedImages::new(), Section::GlobalMap, Target::Design);
        assert_eq!(only(&layout, "GmapTown").pos(), [120.0, 70.0]);
        let time = layout
            .components
            .iter()
            .find(|c| c.key == key("GmapTime"))
            .expect("time text");
        assert_eq!(time.pos(), [120.0, 55.0]);
        assert!(
            layout.components.iter().all(|c| c.key != key("GmapMain")),
            "main position is not a child picture"
        );
    }

    #[test]
    fn main_picture_fixes_design_size_and_missing_one_falls_back() {
        let mut iface = Interface::default();
        iface.common.insert(key("DlgMainPic"), image("dialog.png"));
        let mut images = DecodedImages::new();
        images.insert_still("dialog.png", 640, 480);
        let layout = build(&iface, &images, Section::Dialog, Target::Design);
        assert_eq!(layout.design_size, [640, 480]);
        assert_eq!((layout.scale.x, layout.scale.y), (1.25, 1.25));

        let layout = build(&iface, &DecodedImages::new(), Section::Dialog, XGA);
        assert_eq!(layout.design_size, [800, 600]);
        assert!(layout.components[0].is_placeholder());
        assert_eq!(layout.components.len(), 1);
    }

    #[test]
    fn components_follow_root_pictures_texts_order() {
        let (iface, images) = login();
        let layout = build(&iface, &images, Section::Login, XGA);
        let names: Vec<_> = layout.components.iter().map(|c| c.key.name()).collect();
        assert_eq!(
            names,
            ["LogMainPic", "LogPlay", "LogExit", "LogExitText", "LogExitText"]
        );
    }

    #[test]
    fn identical_inputs_build_identical_layouts() {
        let (iface, images) = login();
        let a = build(&iface, &images, Section::Login, XGA);
        let b = build(&iface, &images, Section::Login, XGA);
        assert_eq!(a, b);
    }

    #[test]
    fn build_errors_render_their_section() {
        let err = BuildError::MissingMainKey {
            section: Section::Login,
            key: "LogMainPic",
        };
        assert!(err.to_string().contains("Login"));
    }
}
