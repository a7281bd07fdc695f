//! System prompt handed to every extraction call.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::Category;

/// Current wall-clock time in Jakarta (UTC+7), the timezone all ledger
/// timestamps use.
#[must_use]
pub fn now_jakarta() -> DateTime<Tz> {
    Utc::now().with_timezone(&chrono_tz::Asia::Jakarta)
}

/// Build the extraction prompt, timestamped so relative phrases like
/// "kemarin" resolve correctly.
#[must_use]
pub fn system_prompt(now: DateTime<Tz>) -> String {
    let categories = Category::ALL
        .iter()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"Kamu adalah manajer keuangan pribadi. Waktu: {timestamp}.
Tugas: Ekstrak informasi transaksi menjadi format JSON Valid.

ATURAN KHUSUS:
1. TRANSFER: Jika notifikasi menyatakan TRANSFER KELUAR (misal: "SeaBank transfer ke ShopeePay"), HANYA catat 1 transaksi: Tipe="Keluar", Kantong="SeaBank". JANGAN catat sisi penerima ("Masuk ShopeePay"), karena aplikasi penerima akan mengirim notifikasinya sendiri.
2. VALIDASI: Jika input hanya berisi placeholder seperti "[notification_title]", "not_text", atau teks yang tidak mengandung informasi keuangan nyata, KEMBALIKAN JSON KOSONG: {{ "transaksi": [] }}. JANGAN MENGARANG DATA.

ATURAN UMUM:
- Tipe: "Masuk" atau "Keluar".
- Kantong: Deteksi akun (BCA, Mandiri, Gopay, Tunai, dll). Default="Tunai".
- Harga: Integer.
- Nama: Singkat, hapus kata kerja (cth: "Bensin Pertalite", "Gajian Bulan Ini").
- Kategori: WAJIB pilih salah satu dari:
  [{categories}].

ATURAN KATEGORI:
- "Isi Saldo", "Top Up", "Transfer ke akun sendiri" -> Kategori WAJIB = "Lainnya".
- Jika Tipe = "Masuk" DAN BUKAN Top Up (misal: Gaji, Bonus, Temu Uang), maka Kategori WAJIB = "Pemasukan".
- Bensin, Parkir, Service, Ojol = "Transportasi".

OUTPUT JSON OBJECT:
{{ "transaksi": [ {{ "tanggal": "YYYY-MM-DD", "jam": "HH:MM", "tipe": "Masuk/Keluar", "kantong": "...", "nama": "...", "satuan": "x", "volume": 1, "harga_satuan": 0, "kategori": "...", "harga_total": 0 }} ] }}"#,
        timestamp = now.format("%Y-%m-%d %H:%M"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn prompt_carries_timestamp_and_categories() {
        let now = chrono_tz::Asia::Jakarta
            .with_ymd_and_hms(2025, 3, 1, 18, 45, 0)
            .unwrap();
        let prompt = system_prompt(now);
        assert!(prompt.contains("2025-03-01 18:45"));
        assert!(prompt.contains("Makan, Transportasi"));
        assert!(prompt.contains(r#""transaksi": []"#));
    }
}
