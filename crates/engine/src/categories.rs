//! Fixed category set used when classifying extracted transactions.

use serde::{Deserialize, Serialize};

/// Spending/income category written verbatim to the ledger.
///
/// The set is closed: provider output that names anything else is coerced to
/// [`Category::Lainnya`] instead of being rejected, so one odd label never
/// drops a whole batch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Makan,
    Transportasi,
    Belanja,
    Tagihan,
    Hiburan,
    Kesehatan,
    Pendidikan,
    Investasi,
    Amal,
    Pemasukan,
    #[default]
    Lainnya,
}

impl Category {
    pub const ALL: [Category; 11] = [
        Category::Makan,
        Category::Transportasi,
        Category::Belanja,
        Category::Tagihan,
        Category::Hiburan,
        Category::Kesehatan,
        Category::Pendidikan,
        Category::Investasi,
        Category::Amal,
        Category::Pemasukan,
        Category::Lainnya,
    ];

    /// Canonical ledger label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Category::Makan => "Makan",
            Category::Transportasi => "Transportasi",
            Category::Belanja => "Belanja",
            Category::Tagihan => "Tagihan",
            Category::Hiburan => "Hiburan",
            Category::Kesehatan => "Kesehatan",
            Category::Pendidikan => "Pendidikan",
            Category::Investasi => "Investasi",
            Category::Amal => "Amal",
            Category::Pemasukan => "Pemasukan",
            Category::Lainnya => "Lainnya",
        }
    }

    /// Map a free-form provider label to a category.
    ///
    /// Matching is case-insensitive; anything outside the set becomes
    /// [`Category::Lainnya`].
    #[must_use]
    pub fn coerce(value: &str) -> Category {
        let trimmed = value.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(trimmed))
            .unwrap_or(Category::Lainnya)
    }
}

impl core::fmt::Display for Category {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
