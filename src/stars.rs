/// The fourteen main stars (主星).
pub const MAIN_STARS: &[&str] = &[
    "紫微", "天府", "天相", "天梁", "武曲", "七殺", "破軍", "廉貞", "天機", "太陽", "太陰", "巨門",
    "天同", "貪狼",
];

/// Auxiliary stars (輔星).
pub const AUX_STARS: &[&str] = &["文曲", "文昌", "左輔", "右弼"];

/// Minor stars (小星). 陀螺 is the canonical spelling here; see `ALIASES`.
pub const MINOR_STARS: &[&str] = &["火星", "鈴星", "祿存", "擎羊", "陀螺"];

/// Spelling aliases resolved before classification.
// TODO: confirm with a practitioner whether 陀羅 → 陀螺 is a deliberate
// house spelling or a transcription slip in the upstream chart source.
pub const ALIASES: &[(&str, &str)] = &[("陀羅", "陀螺")];

/// Brightness and transformation marks that trail a star name.
/// Several can stack, e.g. "太陽旺祿". 星 is not here: 火星/鈴星 keep it.
pub const SUFFIX_CHARS: &[char] = &['旺', '陷', '廟', '地', '平', '權', '科', '祿', '忌', '利', '得'];

/// Which whitelist a normalized star belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StarClass {
    Main,
    Aux,
    Minor,
}

fn resolve_alias(token: &str) -> &str {
    ALIASES
        .iter()
        .find(|(from, _)| *from == token)
        .map(|&(_, to)| to)
        .unwrap_or(token)
}

/// Normalize one raw token from a star line: resolve an alias on the
/// whole token, then strip the trailing suffix run.
///
/// Only a bare "陀羅" is aliased; "陀羅陷" strips to 陀羅, which no
/// whitelist holds.
pub fn normalize_token(token: &str) -> String {
    let token = resolve_alias(token.trim());
    token.trim_end_matches(SUFFIX_CHARS).to_string()
}

/// Classify an already-normalized star name.
pub fn classify(star: &str) -> Option<StarClass> {
    if MAIN_STARS.contains(&star) {
        Some(StarClass::Main)
    } else if AUX_STARS.contains(&star) {
        Some(StarClass::Aux)
    } else if MINOR_STARS.contains(&star) {
        Some(StarClass::Minor)
    } else {
        None
    }
}
