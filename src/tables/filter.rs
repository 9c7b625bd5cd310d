// src/tables/filter.rs

use super::RawTable;

/// Financial vocabulary used by [`FinancialKeywords::default`].
const FINANCIAL_KEYWORDS: &[&str] = &[
    "net income",
    "total assets",
    "revenue",
    "cash flow",
    "balance sheet",
    "statement of operations",
    "comprehensive income",
    "stockholders' equity",
    "earnings per share",
    "operating income",
    "liabilities",
    "expenses",
    "shares purchased",
    "average price",
    "number of shares",
    "tax rate",
    "gross margin",
    "cash equivalents",
    "depreciation",
    "amortization",
];

/// Decides whether an extracted table is kept.
pub trait TableFilter: Send + Sync {
    fn accepts(&self, table: &RawTable) -> bool;

    fn name(&self) -> &'static str;
}

/// Keeps every table, blank ones included.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl TableFilter for AcceptAll {
    fn accepts(&self, _table: &RawTable) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "all"
    }
}

/// Keeps tables whose cell text mentions any keyword (case-insensitive).
#[derive(Debug, Clone)]
pub struct FinancialKeywords {
    keywords: Vec<String>,
}

impl FinancialKeywords {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| fold_text(k.as_ref()))
                .collect(),
        }
    }
}

impl Default for FinancialKeywords {
    fn default() -> Self {
        Self::new(FINANCIAL_KEYWORDS)
    }
}

impl TableFilter for FinancialKeywords {
    fn accepts(&self, table: &RawTable) -> bool {
        if table.rows.is_empty() {
            return false;
        }
        let flat = table
            .rows
            .iter()
            .map(|row| row.join(" "))
            .collect::<Vec<_>>()
            .join(" ");
        let flat = fold_text(&flat);
        self.keywords.iter().any(|k| flat.contains(k.as_str()))
    }

    fn name(&self) -> &'static str {
        "financial"
    }
}

/// Lowercases and maps curly apostrophes to straight ones.
fn fold_text(text: &str) -> String {
    text.to_lowercase().replace(['\u{2019}', '\u{2018}'], "'")
}
