use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

// ── Heavenly stem (天干) ───────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stem {
    /// 甲
    Jia,
    /// 乙
    Yi,
    /// 丙
    Bing,
    /// 丁
    Ding,
    /// 戊
    Wu,
    /// 己
    Ji,
    /// 庚
    Geng,
    /// 辛
    Xin,
    /// 壬
    Ren,
    /// 癸
    Gui,
}

impl Stem {
    pub const ALL: [Stem; 10] = [
        Self::Jia,
        Self::Yi,
        Self::Bing,
        Self::Ding,
        Self::Wu,
        Self::Ji,
        Self::Geng,
        Self::Xin,
        Self::Ren,
        Self::Gui,
    ];

    /// Regex character class body listing every stem.
    pub const CHARS: &'static str = "甲乙丙丁戊己庚辛壬癸";

    pub fn from_char(c: char) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_char() == c)
    }

    pub fn as_char(&self) -> char {
        match self {
            Self::Jia => '甲',
            Self::Yi => '乙',
            Self::Bing => '丙',
            Self::Ding => '丁',
            Self::Wu => '戊',
            Self::Ji => '己',
            Self::Geng => '庚',
            Self::Xin => '辛',
            Self::Ren => '壬',
            Self::Gui => '癸',
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Stem `n` places after this one, wrapping around the ten-stem cycle.
    pub fn offset(&self, n: i64) -> Self {
        Self::ALL[(self.index() as i64 + n).rem_euclid(10) as usize]
    }

    /// Calendar stem of a Gregorian year; 1984 is 甲子.
    pub fn of_year(year: i32) -> Self {
        Self::Jia.offset(i64::from(year) - 1984)
    }
}

impl fmt::Display for Stem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

// ── Earthly branch (地支) ──────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Branch {
    /// 子
    Zi,
    /// 丑
    Chou,
    /// 寅
    Yin,
    /// 卯
    Mao,
    /// 辰
    Chen,
    /// 巳
    Si,
    /// 午
    Wu,
    /// 未
    Wei,
    /// 申
    Shen,
    /// 酉
    You,
    /// 戌
    Xu,
    /// 亥
    Hai,
}

impl Branch {
    pub const ALL: [Branch; 12] = [
        Self::Zi,
        Self::Chou,
        Self::Yin,
        Self::Mao,
        Self::Chen,
        Self::Si,
        Self::Wu,
        Self::Wei,
        Self::Shen,
        Self::You,
        Self::Xu,
        Self::Hai,
    ];

    pub const CHARS: &'static str = "子丑寅卯辰巳午未申酉戌亥";

    pub fn from_char(c: char) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.as_char() == c)
    }

    pub fn as_char(&self) -> char {
        match self {
            Self::Zi => '子',
            Self::Chou => '丑',
            Self::Yin => '寅',
            Self::Mao => '卯',
            Self::Chen => '辰',
            Self::Si => '巳',
            Self::Wu => '午',
            Self::Wei => '未',
            Self::Shen => '申',
            Self::You => '酉',
            Self::Xu => '戌',
            Self::Hai => '亥',
        }
    }

    /// Calendar branch of a Gregorian year; 1984 is 甲子.
    pub fn of_year(year: i32) -> Self {
        Self::ALL[(i64::from(year) - 1984).rem_euclid(12) as usize]
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

// ── Column code: the stem-branch label of a chart position ────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColumnCode {
    pub stem: Stem,
    pub branch: Branch,
}

impl ColumnCode {
    pub fn new(stem: Stem, branch: Branch) -> Self {
        Self { stem, branch }
    }

    /// Parse a two-character code such as "丁巳".
    pub fn parse(s: &str) -> Option<Self> {
        let mut chars = s.chars();
        let stem = Stem::from_char(chars.next()?)?;
        let branch = Branch::from_char(chars.next()?)?;
        if chars.next().is_some() {
            return None;
        }
        Some(Self { stem, branch })
    }
}

impl fmt::Display for ColumnCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.stem, self.branch)
    }
}

// Stems, branches and codes serialize as their characters, e.g. "丁巳"
macro_rules! serialize_as_text {
    ($($ty:ty),*) => {$(
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }
    )*};
}

serialize_as_text!(Stem, Branch, ColumnCode);

// ── Palace (宮位) ──────────────────────────────────────────────────

/// The twelve palaces, declared in canonical rotation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Palace {
    /// 命宮
    Life,
    /// 兄弟宮
    Siblings,
    /// 夫妻宮
    Spouse,
    /// 子女宮
    Children,
    /// 財帛宮
    Wealth,
    /// 疾厄宮
    Health,
    /// 遷移宮
    Travel,
    /// 交友宮 (僕役)
    Friends,
    /// 事業宮 (官祿)
    Career,
    /// 田宅宮
    Property,
    /// 福德宮
    Fortune,
    /// 父母宮
    Parents,
}

/// Life → Parents; the rotation alphabet shared by every cycle.
pub const CANONICAL_ORDER: [Palace; 12] = [
    Palace::Life,
    Palace::Siblings,
    Palace::Spouse,
    Palace::Children,
    Palace::Wealth,
    Palace::Health,
    Palace::Travel,
    Palace::Friends,
    Palace::Career,
    Palace::Property,
    Palace::Fortune,
    Palace::Parents,
];

/// Full-name fragments recognized in bracketed palace names.
/// Checked after the Life rule, so none of these contain 命.
const PALACE_NAMES: &[(&str, Palace)] = &[
    ("兄弟", Palace::Siblings),
    ("夫妻", Palace::Spouse),
    ("子女", Palace::Children),
    ("財帛", Palace::Wealth),
    ("疾厄", Palace::Health),
    ("遷移", Palace::Travel),
    ("交友", Palace::Friends),
    ("奴僕", Palace::Friends),
    ("僕役", Palace::Friends),
    ("事業", Palace::Career),
    ("官祿", Palace::Career),
    ("田宅", Palace::Property),
    ("福德", Palace::Fortune),
    ("父母", Palace::Parents),
];

impl Palace {
    /// One-character abbreviation used in table cells.
    pub fn abbr(&self) -> char {
        match self {
            Self::Life => '命',
            Self::Siblings => '兄',
            Self::Spouse => '夫',
            Self::Children => '子',
            Self::Wealth => '財',
            Self::Health => '疾',
            Self::Travel => '遷',
            Self::Friends => '僕',
            Self::Career => '官',
            Self::Property => '田',
            Self::Fortune => '福',
            Self::Parents => '父',
        }
    }

    pub fn from_abbr(c: char) -> Option<Self> {
        CANONICAL_ORDER.into_iter().find(|p| p.abbr() == c)
    }

    /// Map a bracketed palace name to its palace.
    ///
    /// Anything mentioning 命 is the Life palace, so compound labels
    /// like "命宮-身宮" resolve to Life regardless of the suffix.
    pub fn from_name(name: &str) -> Option<Self> {
        if name.contains('命') {
            return Some(Self::Life);
        }
        PALACE_NAMES
            .iter()
            .find(|(fragment, _)| name.contains(fragment))
            .map(|&(_, p)| p)
    }

    /// Position in `CANONICAL_ORDER`.
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Palace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.abbr())
    }
}

// ── Four transformations (四化) ────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Transformation {
    /// 祿
    Fortune,
    /// 權
    Authority,
    /// 科
    Status,
    /// 忌
    Taboo,
}

impl Transformation {
    /// 祿 → 權 → 科 → 忌; the order labels are appended in.
    pub const ALL: [Transformation; 4] = [
        Self::Fortune,
        Self::Authority,
        Self::Status,
        Self::Taboo,
    ];

    pub fn as_char(&self) -> char {
        match self {
            Self::Fortune => '祿',
            Self::Authority => '權',
            Self::Status => '科',
            Self::Taboo => '忌',
        }
    }
}

impl fmt::Display for Transformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_stem_and_branch() {
        assert_eq!(Stem::of_year(1984), Stem::Jia);
        assert_eq!(Branch::of_year(1984), Branch::Zi);
        assert_eq!(Stem::of_year(1990), Stem::Geng);
        assert_eq!(Branch::of_year(1990), Branch::Wu);
        assert_eq!(Stem::of_year(2026), Stem::Bing);
        assert_eq!(Branch::of_year(2026), Branch::Wu);
        // Years before the reference wrap around
        assert_eq!(Stem::of_year(1983), Stem::Gui);
        assert_eq!(Branch::of_year(1983), Branch::Hai);
    }

    #[test]
    fn test_column_code_parse() {
        let code = ColumnCode::parse("丁巳").unwrap();
        assert_eq!(code.stem, Stem::Ding);
        assert_eq!(code.branch, Branch::Si);
        assert_eq!(code.to_string(), "丁巳");
        assert_eq!(ColumnCode::parse("丁"), None);
        assert_eq!(ColumnCode::parse("丁巳年"), None);
        assert_eq!(ColumnCode::parse("巳丁"), None);
    }

    #[test]
    fn test_palace_from_name() {
        assert_eq!(Palace::from_name("命宮"), Some(Palace::Life));
        assert_eq!(Palace::from_name("命宮-身宮"), Some(Palace::Life));
        assert_eq!(Palace::from_name("財帛宮-身宮"), Some(Palace::Wealth));
        assert_eq!(Palace::from_name("事業宮"), Some(Palace::Career));
        assert_eq!(Palace::from_name("官祿宮"), Some(Palace::Career));
        assert_eq!(Palace::from_name("交友宮"), Some(Palace::Friends));
        assert_eq!(Palace::from_name("中宮"), None);
    }

    #[test]
    fn test_canonical_order_indices() {
        for (i, p) in CANONICAL_ORDER.iter().enumerate() {
            assert_eq!(p.index(), i);
            assert_eq!(Palace::from_abbr(p.abbr()), Some(*p));
        }
    }

    #[test]
    fn test_serialize_as_text() {
        let code = ColumnCode::new(Stem::Ding, Branch::Si);
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"丁巳\"");
        assert_eq!(serde_json::to_string(&Stem::Geng).unwrap(), "\"庚\"");
    }

    #[test]
    fn test_stem_offset_wraps() {
        assert_eq!(Stem::Gui.offset(1), Stem::Jia);
        assert_eq!(Stem::Jia.offset(-1), Stem::Gui);
        assert_eq!(Stem::Bing.offset(14), Stem::Geng);
    }
}
