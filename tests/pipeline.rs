//! End-to-end: chart text → parsed chart → table → Markdown.

use ziwei_chart::config::{MonthSwitches, PalaceSwitches};
use ziwei_chart::render::to_markdown;
use ziwei_chart::validate::validate;
use ziwei_chart::{
    ChartTable, OutputSwitches, RequestContext, TableRow, build_table, interpret, parse_chart,
};

// 1990 庚午 male, 火六局, 命 at 寅, decades running forward.
const PREFACE: &str = "陽曆:1990年2月1日0時\n\
農曆:1990年1月6日子時\n\
干支:庚午年戊寅月甲子日甲子時\n\
五行局:火六局\n\
命主:祿存 身主:火星\n";

const BLOCKS: [&str; 12] = [
    "戊寅【命宮】\n大限:6-15\n小限:1 13 25 37 49\n紫微廟,天府廟,文昌",
    "己卯【父母宮】\n大限:16-25\n文曲、鈴星",
    "庚辰【福德宮】\n大限:26-35\n七殺,火星",
    "辛巳【田宅宮】\n大限:36-45\n天梁,擎羊",
    "壬午【事業宮-身宮】\n大限:46-55\n天相,祿存,右弼",
    "癸未【交友宮】\n大限:56-65\n巨門旺,陀羅",
    "甲申【遷移宮】\n大限:66-75\n廉貞,貪狼",
    "乙酉【疾厄宮】\n大限:76-85\n太陰旺科",
    "丙戌【財帛宮】\n大限:86-95\n武曲廟權,天同平忌",
    "丁亥【子女宮】\n大限:96-105\n太陽陷祿",
    "戊子【夫妻宮】\n大限:106-115\n破軍旺",
    "己丑【兄弟宮】\n大限:116-125\n天機陷　左輔",
];

const CANONICAL_COLUMNS: [&str; 12] = [
    "戊寅", "己丑", "戊子", "丁亥", "丙戌", "乙酉", "甲申", "癸未", "壬午", "辛巳", "庚辰", "己卯",
];

fn chart_text<'a>(preface: &str, blocks: impl Iterator<Item = &'a str>) -> String {
    let mut text = preface.to_string();
    for block in blocks {
        text.push('\n');
        text.push_str(block);
        text.push('\n');
    }
    text
}

fn fixture() -> String {
    chart_text(PREFACE, BLOCKS.iter().copied())
}

fn build(text: &str, switches: &OutputSwitches) -> ChartTable {
    let chart = parse_chart(text);
    let ctx = RequestContext::new(2026).with_birth_year(chart.birth_year);
    build_table(&chart, &ctx, switches)
}

fn default_table() -> ChartTable {
    build(&fixture(), &OutputSwitches::default())
}

fn rows_with_sub<'a>(table: &'a ChartTable, sub_label: &str) -> Vec<&'a TableRow> {
    table.rows.iter().filter(|r| r.sub_label == sub_label).collect()
}

fn cell<'a>(table: &'a ChartTable, row: &'a TableRow, code: &str) -> &'a str {
    table.cell(row, code).unwrap()
}

#[test]
fn test_columns_in_canonical_order() {
    let table = default_table();
    assert_eq!(table.columns, CANONICAL_COLUMNS);
    let natal = table.row_by_label("本命").unwrap();
    assert_eq!(natal.cells.concat(), "命兄夫子財疾遷僕官田福父");
}

#[test]
fn test_block_order_does_not_change_columns() {
    let reversed = chart_text(PREFACE, BLOCKS.iter().rev().copied());
    assert_eq!(build(&reversed, &OutputSwitches::default()), default_table());
}

#[test]
fn test_every_row_is_rectangular() {
    let table = default_table();
    assert!(table.is_rectangular());
    // natal 6 + decade 13 + annual 15 + months 24
    assert_eq!(table.rows.len(), 58);
}

#[test]
fn test_same_input_same_table() {
    let text = fixture();
    assert_eq!(
        build(&text, &OutputSwitches::default()),
        build(&text, &OutputSwitches::default())
    );
    assert_eq!(interpret(&text, 2026, &OutputSwitches::default()), default_table());
}

#[test]
fn test_star_rows() {
    let table = default_table();
    let main = table.row_by_sub_label("主星").unwrap();
    assert_eq!(cell(&table, main, "戊寅"), "紫微/天府");
    assert_eq!(cell(&table, main, "丙戌"), "武曲/天同");
    let aux = table.row_by_sub_label("輔星").unwrap();
    assert_eq!(cell(&table, aux, "己丑"), "左輔");
    let minor = table.row_by_sub_label("小星").unwrap();
    assert_eq!(cell(&table, minor, "癸未"), "陀螺");
    let decade = table.row_by_sub_label("大限").unwrap();
    assert_eq!(cell(&table, decade, "壬午"), "46~55");
}

#[test]
fn test_natal_transformations() {
    let table = default_table();
    let row = table.row_by_sub_label("生年四化（庚）").unwrap();
    assert_eq!(cell(&table, row, "丁亥"), "太陽祿");
    assert_eq!(cell(&table, row, "丙戌"), "武曲權/天同忌");
    assert_eq!(cell(&table, row, "乙酉"), "太陰科");
    assert_eq!(cell(&table, row, "戊寅"), "");
}

#[test]
fn test_decade_rotation_from_age() {
    let table = default_table();
    // 2026 − 1990 = 36 → 36~45 on the 田宅 column 辛巳
    let row = table.row_by_label("大限命").unwrap();
    assert_eq!(cell(&table, row, "辛巳"), "命");
    assert_eq!(cell(&table, row, "庚辰"), "兄");
    assert_eq!(cell(&table, row, "己卯"), "夫");
    assert_eq!(cell(&table, row, "戊寅"), "子");
    assert_eq!(cell(&table, row, "壬午"), "父");

    let life = table.row_by_sub_label("大命四化（辛）").unwrap();
    assert_eq!(cell(&table, life, "癸未"), "巨門祿");
    assert_eq!(cell(&table, life, "丁亥"), "太陽權");
    assert_eq!(cell(&table, life, "己卯"), "文曲科");
    assert_eq!(cell(&table, life, "戊寅"), "文昌忌");

    // 大兄 sits on 庚辰
    assert!(table.row_by_sub_label("大兄四化（庚）").is_some());
}

#[test]
fn test_decade_on_career_column() {
    // Swap the 田宅 and 事業 ranges so 36~45 falls on 【事業宮】
    let text = fixture()
        .replace("【田宅宮】\n大限:36-45", "【田宅宮】\n大限:46-55")
        .replace("【事業宮-身宮】\n大限:46-55", "【事業宮-身宮】\n大限:36-45");
    let table = build(&text, &OutputSwitches::default());
    let career = table.columns.iter().position(|c| c == "壬午").unwrap();
    let next = &table.columns[career + 1];

    let natal = table.row_by_label("本命").unwrap();
    assert_eq!(natal.cells[career], "官");
    assert_eq!(natal.cells[career + 1], "田");

    let decade = table.row_by_label("大限命").unwrap();
    assert_eq!(decade.cells[career], "命");
    assert_eq!(cell(&table, decade, next), "兄");
    assert!(table.row_by_sub_label("大命四化（壬）").is_some());
}

#[test]
fn test_annual_rows_split_when_stems_differ() {
    let table = default_table();
    let row = table.row_by_label("流年命（2026）").unwrap();
    assert_eq!(cell(&table, row, "壬午"), "命");
    assert_eq!(cell(&table, row, "辛巳"), "兄");
    assert_eq!(cell(&table, row, "戊寅"), "財");

    // 2026 is 丙午; the 午 column carries 壬
    let by_year = table.row_by_sub_label("流命四化（丙）").unwrap();
    assert_eq!(cell(&table, by_year, "丙戌"), "天同祿");
    assert_eq!(cell(&table, by_year, "己丑"), "天機權");
    assert_eq!(cell(&table, by_year, "戊寅"), "文昌科");
    assert_eq!(cell(&table, by_year, "甲申"), "廉貞忌");

    let by_branch = rows_with_sub(&table, "流命四化（壬）");
    // Once as the branch-stem row, once as the per-palace 流命 row
    assert_eq!(by_branch.len(), 2);
    assert_eq!(cell(&table, by_branch[0], "戊寅"), "紫微權");
    assert_eq!(cell(&table, by_branch[0], "丙戌"), "武曲忌");
}

#[test]
fn test_monthly_offsets() {
    let table = default_table();
    // Natal 命 is on the 寅 column and sits on 壬午 in the 2026 annual cycle
    let m1 = table.row_by_label("流月命（2026-01）").unwrap();
    assert_eq!(cell(&table, m1, "壬午"), "命");
    let m3 = table.row_by_label("流月命（2026-03）").unwrap();
    assert_eq!(cell(&table, m3, "甲申"), "命");
    let m12 = table.row_by_label("流月命（2026-12）").unwrap();
    assert_eq!(cell(&table, m12, "辛巳"), "命");

    let month_rows = rows_with_sub(&table, "流月四化（庚）");
    // 2026 months 1 and 11 both carry 庚
    assert_eq!(month_rows.len(), 2);
    assert_eq!(cell(&table, month_rows[0], "丙戌"), "武曲權/天同忌");
}

#[test]
fn test_month_stems_derived_without_table() {
    let chart = parse_chart(&fixture());
    let ctx = RequestContext::new(2027).with_birth_year(chart.birth_year);
    let table = build_table(&chart, &ctx, &OutputSwitches::default());

    // 2027 丁未 has no literal table; month 1 takes the year stem 丁
    let m1 = table
        .rows
        .iter()
        .position(|r| r.label == "流月命（2027-01）")
        .unwrap();
    let hua = &table.rows[m1 + 1];
    assert_eq!(hua.sub_label, "流月四化（丁）");
    assert_eq!(cell(&table, hua, "乙酉"), "太陰祿");
    assert_eq!(cell(&table, hua, "丙戌"), "天同權");
    assert_eq!(cell(&table, hua, "己丑"), "天機科");
    assert_eq!(cell(&table, hua, "癸未"), "巨門忌");

    let m2 = table
        .rows
        .iter()
        .position(|r| r.label == "流月命（2027-02）")
        .unwrap();
    assert_eq!(table.rows[m2 + 1].sub_label, "流月四化（戊）");
}

#[test]
fn test_switches_drop_rows() {
    let switches = OutputSwitches {
        decade: PalaceSwitches {
            health: false,
            ..PalaceSwitches::default()
        },
        annual_branch_stem_row: false,
        months: MonthSwitches {
            months: [1].into_iter().collect(),
            ..MonthSwitches::default()
        },
        ..OutputSwitches::default()
    };
    let table = build(&fixture(), &switches);
    assert!(table.is_rectangular());
    // natal 6 + decade 12 + annual 14 + month 1 × 2
    assert_eq!(table.rows.len(), 34);
    assert!(table.rows.iter().all(|r| !r.sub_label.starts_with("大疾四化")));
    assert_eq!(rows_with_sub(&table, "流命四化（壬）").len(), 1);
    assert!(table.row_by_label("流月命（2026-02）").is_none());
}

#[test]
fn test_missing_birth_year_blanks_decade_rows() {
    let preface: String = PREFACE
        .lines()
        .filter(|l| !l.starts_with("陽曆"))
        .map(|l| format!("{l}\n"))
        .collect();
    let table = build(
        &chart_text(&preface, BLOCKS.iter().copied()),
        &OutputSwitches::default(),
    );
    assert_eq!(table.rows.len(), 58);
    assert!(table.row_by_label("大限命").unwrap().is_blank());
    assert!(table.row_by_sub_label("大命四化（）").unwrap().is_blank());
    // Annual rows do not depend on the birth year
    assert!(!table.row_by_label("流年命（2026）").unwrap().is_blank());
}

#[test]
fn test_duplicate_block_first_wins() {
    let mut blocks: Vec<&str> = BLOCKS.to_vec();
    blocks.push("戊寅【遷移宮】\n大限:6-15\n貪狼");
    let text = chart_text(PREFACE, blocks.into_iter());
    let table = build(&text, &OutputSwitches::default());
    assert_eq!(table.columns.len(), 12);
    let main = table.row_by_sub_label("主星").unwrap();
    assert_eq!(cell(&table, main, "戊寅"), "紫微/天府");
}

#[test]
fn test_complete_chart_has_no_diagnostics() {
    let chart = parse_chart(&fixture());
    let diagnostics = validate(&chart);
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
    assert_eq!(chart.center.five_element.as_deref(), Some("火六局"));
}

#[test]
fn test_markdown_output() {
    let table = default_table();
    let md = to_markdown(&table);
    let lines: Vec<&str> = md.lines().collect();
    assert_eq!(lines.len(), 2 + 58);
    assert!(lines[0].starts_with("| 原始資料 | 宮干支 | 戊寅 | 己丑 |"));
    assert!(lines.iter().any(|l| l.starts_with("| 本命 | 宮位 | 命 | 兄 |")));
}
