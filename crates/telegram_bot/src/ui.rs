//! User-facing text and keyboards.

use teloxide::types::{KeyboardButton, KeyboardMarkup};

use engine::{BalanceSummary, format_rupiah};

pub(crate) const MENU_BALANCE: &str = "💰 Cek Saldo";
pub(crate) const MENU_ANALYSIS: &str = "📊 Analisis";
pub(crate) const MENU_UNDO: &str = "↩️ Undo Terakhir";
pub(crate) const MENU_HELP: &str = "❓ Bantuan";

pub(crate) fn main_menu() -> KeyboardMarkup {
    let mut kb = KeyboardMarkup::new(vec![
        vec![
            KeyboardButton::new(MENU_BALANCE),
            KeyboardButton::new(MENU_ANALYSIS),
        ],
        vec![
            KeyboardButton::new(MENU_UNDO),
            KeyboardButton::new(MENU_HELP),
        ],
    ]);
    kb.resize_keyboard = true;
    kb
}

pub(crate) fn menu_text() -> &'static str {
    "🤖 Menu Utama:\nSilakan pilih opsi atau ketik transaksi langsung."
}

pub(crate) fn help_text() -> &'static str {
    "📚 Panduan Bot Keuangan\n\n\
     1. Catat Transaksi:\n\
     - Ketik: \"Beli nasi goreng 15rb\"\n\
     - Kirim Foto Struk\n\
     - Kirim Voice Note\n\n\
     2. Perintah:\n\
     - /setsaldo [Kantong] [Jumlah] : Koreksi saldo\n\
     - /undo : Hapus transaksi terakhir\n\
     - /reset confirm : Hapus SEMUA data"
}

pub(crate) fn render_balance_report(summary: &BalanceSummary) -> String {
    if summary.accounts.is_empty() {
        return "Belum ada data.".to_string();
    }

    let mut report = "💰 Kondisi Keuangan\n".to_string();
    for (account, balance) in &summary.accounts {
        report.push_str(&format!("\n🏦 {account}: {}", format_rupiah(*balance)));
    }
    report.push_str(&format!("\n\n💎 Total: {}", format_rupiah(summary.total)));
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn balance_report_lists_accounts_and_total() {
        let summary = BalanceSummary {
            accounts: vec![
                ("BCA".to_string(), 980_000),
                ("GoPay".to_string(), -5_000),
            ],
            total: 975_000,
        };
        let report = render_balance_report(&summary);
        assert!(report.contains("🏦 BCA: Rp 980.000"));
        assert!(report.contains("🏦 GoPay: Rp -5.000"));
        assert!(report.contains("💎 Total: Rp 975.000"));
    }

    #[test]
    fn empty_summary_has_a_friendly_message() {
        let summary = BalanceSummary {
            accounts: vec![],
            total: 0,
        };
        assert_eq!(render_balance_report(&summary), "Belum ada data.");
    }
}
