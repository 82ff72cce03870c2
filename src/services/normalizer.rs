//! Product-name cleanup and category assignment.
//!
//! Categories are assigned by [`CATEGORY_RULES`], an ordered priority list:
//! a product name can satisfy several rules, and the first one wins.

/// Category of anything no rule recognizes. Such rows are dropped from sales
/// reports, and the same label names the merged small-share slice of a
/// composition breakdown.
pub const OTHER_CATEGORY: &str = "其他";

/// Full-width and Chinese punctuation with its ASCII counterpart.
const PUNCTUATION_MAP: &[(char, char)] = &[
    ('，', ','),
    ('。', '.'),
    ('；', ';'),
    ('：', ':'),
    ('！', '!'),
    ('？', '?'),
    ('（', '('),
    ('）', ')'),
    ('【', '['),
    ('】', ']'),
    ('“', '"'),
    ('”', '"'),
    ('＂', '"'),
    ('‘', '\''),
    ('’', '\''),
    ('＇', '\''),
    ('《', '<'),
    ('》', '>'),
];

/// A product family matched by keywords, optionally split further.
#[derive(Debug)]
pub struct CategoryRule {
    /// Every keyword must occur in the (normalized) name.
    pub keywords: &'static [&'static str],
    pub category: &'static str,
    /// Checked in order once the family matched; if none matches the
    /// family-level `category` applies.
    pub sub_rules: &'static [CategoryRule],
}

impl CategoryRule {
    const fn new(keywords: &'static [&'static str], category: &'static str) -> Self {
        Self {
            keywords,
            category,
            sub_rules: &[],
        }
    }

    const fn with_sub_rules(
        keywords: &'static [&'static str],
        category: &'static str,
        sub_rules: &'static [CategoryRule],
    ) -> Self {
        Self {
            keywords,
            category,
            sub_rules,
        }
    }

    pub fn matches(&self, name: &str) -> bool {
        self.keywords.iter().all(|k| name.contains(k))
    }

    fn resolve(&self, name: &str) -> &'static str {
        self.sub_rules
            .iter()
            .find(|sub| sub.matches(name))
            .map(|sub| sub.resolve(name))
            .unwrap_or(self.category)
    }
}

const DAMEISHOU_GRADES: &[CategoryRule] = &[
    CategoryRule::new(&["20-20-20+TE"], "雷力大美收 20-20-20+TE"),
    CategoryRule::new(&["14-6-30+TE"], "雷力大美收 14-6-30+TE"),
];

pub const CATEGORY_RULES: &[CategoryRule] = &[
    CategoryRule::new(&["极银双星"], "雷力闷棚专用极银双星套餐"),
    CategoryRule::new(&["海德丰"], "雷力海德丰"),
    CategoryRule::new(&["多葆", "3B"], "雷力多葆(3B)"),
    CategoryRule::new(&["海補1号"], "雷力海補1号 海藻有机颗粒肥"),
    CategoryRule::new(&["呼吸基"], "雷力呼吸基 微生物菌剂"),
    CategoryRule::new(&["壮能", "10-6-9"], "雷力壮能 10-6-9"),
    CategoryRule::with_sub_rules(&["大美收"], "雷力大美收", DAMEISHOU_GRADES),
    CategoryRule::new(&["海聚收"], "雷力海聚收"),
    CategoryRule::new(&["海乐速"], "雷力海乐速"),
    CategoryRule::new(&["绿库"], "雷力绿库系列"),
    CategoryRule::new(&["壤护生"], "壤护生 绿色木霉菌剂"),
    CategoryRule::new(&["上好拌"], "上好拌"),
    CategoryRule::new(&["福达"], "福达水剂"),
];

pub fn normalize_punctuation(text: &str) -> String {
    text.chars()
        .map(|c| {
            PUNCTUATION_MAP
                .iter()
                .find(|(wide, _)| *wide == c)
                .map(|(_, narrow)| *narrow)
                .unwrap_or(c)
        })
        .collect()
}

/// Same as [`normalize_punctuation`] for a nullable column; `None` passes
/// through unchanged.
pub fn normalize_optional(text: Option<&str>) -> Option<String> {
    text.map(normalize_punctuation)
}

pub fn categorize(name: &str) -> &'static str {
    let name = normalize_punctuation(name);
    CATEGORY_RULES
        .iter()
        .find(|rule| rule.matches(&name))
        .map(|rule| rule.resolve(&name))
        .unwrap_or(OTHER_CATEGORY)
}

/// Category of a nullable product name; a missing name is "Other".
pub fn categorize_optional(name: Option<&str>) -> &'static str {
    name.map(categorize).unwrap_or(OTHER_CATEGORY)
}
