use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;
use tracing::debug;

use crate::palace::{DecadeRange, PalaceColumn, PalaceRegistry};
use crate::stars::{classify, normalize_token};
use crate::types::{Branch, ColumnCode, Stem};

// ── Regex patterns ─────────────────────────────────────────────────
//
// Real data examples (one block per palace, blank line between blocks):
//
//     丁巳【事業宮】
//     大限:36-45
//     小限:5 17 29 41 53 65
//     紫微廟,七殺平,文昌利,火星,天馬
//
//     戊午【交友宮】
//     大限 46－55
//     小限:4 16 28
//     40 52 64
//     天機旺、陀羅
//
//   Central box (not a palace; never enters the registry):
//     陽曆:1990年2月1日0時
//     農曆:1990年1月6日子時
//     干支:庚午年戊寅月...
//     五行局:水二局
//     命主:巨門 身主:天相

// Block header: {stem}{branch}【{palace name}】
static RE_BLOCK_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?P<stem>[{}])(?P<branch>[{}])\s*【(?P<palace>[^】]+)】",
        Stem::CHARS,
        Branch::CHARS
    ))
    .unwrap()
});

// A blank line ends a block even when no header follows.
static RE_BLANK_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t\u{3000}]*\r?\n").unwrap());

// 大限:36-45 / 大限 36－45 / 大\n限：36 ~ 45  (may wrap across lines)
static RE_DECADE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"大\s*限[:：︰]?\s*(?P<lo>\d{1,3})\s*[-~－—～]\s*(?P<hi>\d{1,3})").unwrap()
});

// 小限:5 17 29 41  (the number run may continue on following lines)
static RE_SMALL_CYCLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"小\s*限[:：︰]?(?P<ages>[0-9\s,，、]*)").unwrap());

static RE_DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{1,3}").unwrap());

// Star tokens are separated by commas, 、, and any whitespace (incl. 　).
static RE_STAR_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[,，、;；\s]+").unwrap());

// 陽曆:1990年2月1日
static RE_SOLAR_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"陽曆[:：︰]?\s*(?P<year>\d{4})年").unwrap());

// 干支:庚午年
static RE_BIRTH_STEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"干支[:：︰]\s*(?P<stem>[{}])(?P<branch>[{}])年",
        Stem::CHARS,
        Branch::CHARS
    ))
    .unwrap()
});

// Whole-line captures for the central box
static RE_SOLAR_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"陽曆[:：︰]?\s*(?P<v>[^\n]+)").unwrap());
static RE_LUNAR_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"農曆[:：︰]?\s*(?P<v>[^\n]+)").unwrap());

// 五行局:水二局 / 土五局
static RE_FIVE_ELEMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?P<v>[水木金土火][二三四五六]局)").unwrap());

// 命主:巨門 身主:天相
static RE_LIFE_MASTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"命主[:：︰]?\s*(?P<v>[^\s,，、:：︰]+)").unwrap());
static RE_BODY_MASTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"身主[:：︰]?\s*(?P<v>[^\s,，、:：︰]+)").unwrap());

// ── Parsed chart ───────────────────────────────────────────────────

/// Summary information from the chart's central box.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CenterInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lunar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ganzhi: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub five_element: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub life_master: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_master: Option<String>,
}

impl CenterInfo {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Everything extracted from one chart text.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Chart {
    pub registry: PalaceRegistry,
    pub birth_year: Option<i32>,
    pub birth_stem: Option<Stem>,
    pub center: CenterInfo,
}

/// Parse a full chart text. Never fails: unrecognized text yields an
/// empty registry and `None` fields.
pub fn parse_chart(text: &str) -> Chart {
    let text = text.replace("\r\n", "\n");
    let registry = parse_blocks(&text);
    let chart = Chart {
        registry,
        birth_year: parse_birth_year(&text),
        birth_stem: parse_birth_stem(&text),
        center: parse_center_info(&text),
    };
    debug!(
        columns = chart.registry.len(),
        birth_year = ?chart.birth_year,
        birth_stem = ?chart.birth_stem.map(|s| s.as_char()),
        "parsed chart"
    );
    chart
}

/// Byte spans of each palace block: (header start, header end, body end).
///
/// A body runs to the next header or the first blank line, whichever
/// comes first.
fn block_spans(text: &str) -> Vec<(usize, usize, usize)> {
    let headers: Vec<regex::Match> = RE_BLOCK_HEADER.find_iter(text).collect();
    headers
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let next_header = headers.get(i + 1).map_or(text.len(), |n| n.start());
            let body = &text[m.end()..next_header];
            let body_len = RE_BLANK_LINE.find(body).map_or(body.len(), |b| b.start());
            (m.start(), m.end(), m.end() + body_len)
        })
        .collect()
}

/// Locate every palace block and build the registry.
pub fn parse_blocks(text: &str) -> PalaceRegistry {
    let mut registry = PalaceRegistry::default();
    for (start, header_end, body_end) in block_spans(text) {
        let Some(caps) = RE_BLOCK_HEADER.captures(&text[start..header_end]) else {
            continue;
        };
        if let Some(column) = parse_block(&caps, &text[header_end..body_end]) {
            registry.insert(column);
        }
    }
    registry
}

fn parse_block(header: &regex::Captures, body: &str) -> Option<PalaceColumn> {
    let stem = Stem::from_char(header.name("stem")?.as_str().chars().next()?)?;
    let branch = Branch::from_char(header.name("branch")?.as_str().chars().next()?)?;
    let palace_name = header.name("palace")?.as_str().trim();

    let mut column = PalaceColumn::new(ColumnCode::new(stem, branch), palace_name);

    // Remove the age fields first so their digits never reach star splitting
    let (decade, rest) = extract_decade_range(body);
    column.decade = decade;
    let (ages, rest) = extract_small_cycle(&rest);
    column.small_cycle_ages = ages;

    for token in split_star_tokens(&rest) {
        let star = normalize_token(token);
        if let Some(class) = classify(&star) {
            column.add_star(class, &star);
        }
    }
    Some(column)
}

/// Find a 大限 range anywhere in `body` and return it with the remaining text.
///
/// "大限:36-45\n紫微" → (Some(36~45), "\n紫微")
pub fn extract_decade_range(body: &str) -> (Option<DecadeRange>, String) {
    let Some(caps) = RE_DECADE.captures(body) else {
        return (None, body.to_string());
    };
    let lo = caps.name("lo").and_then(|m| m.as_str().parse().ok());
    let hi = caps.name("hi").and_then(|m| m.as_str().parse().ok());
    let Some(whole) = caps.get(0) else {
        return (None, body.to_string());
    };
    let rest = format!("{}{}", &body[..whole.start()], &body[whole.end()..]);
    match (lo, hi) {
        (Some(lo), Some(hi)) => (Some(DecadeRange { lo, hi }), rest),
        _ => (None, rest),
    }
}

/// Find a 小限 age list and return its ages with the remaining text.
///
/// "小限:5 17 29\n紫微" → ([5, 17, 29], "紫微")
pub fn extract_small_cycle(body: &str) -> (Vec<u32>, String) {
    let Some(caps) = RE_SMALL_CYCLE.captures(body) else {
        return (Vec::new(), body.to_string());
    };
    let ages = caps
        .name("ages")
        .map(|m| {
            RE_DIGITS
                .find_iter(m.as_str())
                .filter_map(|d| d.as_str().parse().ok())
                .collect()
        })
        .unwrap_or_default();
    let Some(whole) = caps.get(0) else {
        return (ages, body.to_string());
    };
    let rest = format!("{}{}", &body[..whole.start()], &body[whole.end()..]);
    (ages, rest)
}

/// Split star text on mixed punctuation, dropping empty pieces.
pub fn split_star_tokens(text: &str) -> Vec<&str> {
    RE_STAR_SEPARATOR
        .split(text)
        .filter(|t| !t.is_empty())
        .collect()
}

/// Birth year from the `陽曆:YYYY年` preface.
pub fn parse_birth_year(text: &str) -> Option<i32> {
    RE_SOLAR_YEAR
        .captures(text)
        .and_then(|c| c.name("year"))
        .and_then(|m| m.as_str().parse().ok())
}

/// Birth-year stem from the `干支:<stem><branch>年` preface.
pub fn parse_birth_stem(text: &str) -> Option<Stem> {
    RE_BIRTH_STEM
        .captures(text)
        .and_then(|c| c.name("stem"))
        .and_then(|m| m.as_str().chars().next())
        .and_then(Stem::from_char)
}

/// Pick the central box fields out of the text outside palace blocks.
pub fn parse_center_info(text: &str) -> CenterInfo {
    // Drop palace blocks so their star lines cannot match 命主 etc.
    let mut outside = String::new();
    let mut last = 0;
    for (start, _, body_end) in block_spans(text) {
        outside.push_str(&text[last..start]);
        last = body_end;
    }
    outside.push_str(&text[last..]);

    let capture = |re: &Regex| -> Option<String> {
        re.captures(&outside)
            .and_then(|c| c.name("v"))
            .map(|m| m.as_str().trim().to_string())
            .filter(|s| !s.is_empty())
    };
    let ganzhi = RE_BIRTH_STEM.captures(&outside).and_then(|c| {
        let stem = c.name("stem")?.as_str();
        let branch = c.name("branch")?.as_str();
        Some(format!("{stem}{branch}"))
    });

    CenterInfo {
        solar: capture(&RE_SOLAR_LINE),
        lunar: capture(&RE_LUNAR_LINE),
        ganzhi,
        five_element: capture(&RE_FIVE_ELEMENT),
        life_master: capture(&RE_LIFE_MASTER),
        body_master: capture(&RE_BODY_MASTER),
    }
}
