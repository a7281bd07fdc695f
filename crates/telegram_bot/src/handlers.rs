//! Message handling: menu buttons, commands, and the transaction flow.

use teloxide::{
    net::Download,
    prelude::*,
    types::{FileId, User},
};

use engine::{
    CommitOutcome, EngineError, ImageData, Source, format_rupiah, render_report,
};

use crate::{
    ConfigParameters,
    commands::{Command, parse_amount, parse_command},
    ui,
};

const BALANCE_KEYWORDS: [&str; 5] = ["saldo", "cek uang", "dompet", "keuanganku", "sisa uang"];
const ANALYSIS_KEYWORDS: [&str; 12] = [
    "analisa",
    "grafik",
    "chart",
    "plot",
    "tren",
    "statistik",
    "berapa",
    "total",
    "bandingkan",
    "habis berapa",
    "bulan ini",
    "minggu ini",
];

pub(crate) async fn handle_message(
    bot: Bot,
    msg: Message,
    cfg: ConfigParameters,
) -> ResponseResult<()> {
    if !is_allowed(&cfg, msg.from.as_ref()) {
        return Ok(());
    }
    let chat_id = msg.chat.id;

    if msg.voice().is_some() {
        return handle_voice(&bot, &msg, &cfg).await;
    }
    if msg.photo().is_some() {
        return handle_photo(&bot, &msg, &cfg).await;
    }

    let Some(text) = msg.text() else {
        return Ok(());
    };

    match text {
        ui::MENU_BALANCE => return send_balance(&bot, chat_id, &cfg).await,
        ui::MENU_UNDO => return handle_undo(&bot, chat_id, &cfg).await,
        ui::MENU_HELP => {
            bot.send_message(chat_id, ui::help_text()).await?;
            return Ok(());
        }
        ui::MENU_ANALYSIS => {
            bot.send_message(
                chat_id,
                "💡 Silakan ketik pertanyaan analisis Anda.\nContoh: 'Berapa pengeluaran makan bulan ini?'",
            )
            .await?;
            return Ok(());
        }
        _ => {}
    }

    if let Some(cmd) = parse_command(text) {
        match cmd {
            Command::Start => {
                bot.send_message(chat_id, ui::menu_text())
                    .reply_markup(ui::main_menu())
                    .await?;
            }
            Command::Help => {
                bot.send_message(chat_id, ui::help_text()).await?;
            }
            Command::Undo => return handle_undo(&bot, chat_id, &cfg).await,
            Command::Reset { confirmed } => return handle_reset(&bot, chat_id, &cfg, confirmed).await,
            Command::SetBalance {
                account,
                amount_raw,
            } => return handle_set_balance(&bot, chat_id, &cfg, &account, &amount_raw).await,
            Command::SetBalanceUsage => {
                bot.send_message(
                    chat_id,
                    "⚠️ Format salah. Gunakan: /setsaldo [NamaKantong] [JumlahUang]",
                )
                .await?;
            }
            Command::Unknown => {
                bot.send_message(chat_id, "❓ Perintah tidak dikenal. Ketik /help untuk panduan.")
                    .await?;
            }
        }
        return Ok(());
    }

    let lowered = text.to_lowercase();
    if BALANCE_KEYWORDS.iter().any(|k| lowered.contains(k)) {
        return send_balance(&bot, chat_id, &cfg).await;
    }
    if ANALYSIS_KEYWORDS.iter().any(|k| lowered.contains(k)) && text.split_whitespace().count() > 1
    {
        bot.send_message(chat_id, "🧠 Analisis data belum tersedia di versi ini.")
            .await?;
        return Ok(());
    }

    commit_and_report(&bot, chat_id, &cfg, text).await
}

fn is_allowed(cfg: &ConfigParameters, from: Option<&User>) -> bool {
    let Some(from) = from else {
        return false;
    };
    match &cfg.allowed_users {
        None => true,
        Some(ids) => ids.contains(&from.id),
    }
}

async fn download(bot: &Bot, file_id: FileId) -> Result<Vec<u8>, String> {
    let file = bot
        .get_file(file_id)
        .await
        .map_err(|err| err.to_string())?;
    let mut buffer = Vec::new();
    bot.download_file(&file.path, &mut buffer)
        .await
        .map_err(|err| err.to_string())?;
    Ok(buffer)
}

async fn handle_voice(bot: &Bot, msg: &Message, cfg: &ConfigParameters) -> ResponseResult<()> {
    let chat_id = msg.chat.id;
    let Some(voice) = msg.voice() else {
        return Ok(());
    };

    let progress = bot.send_message(chat_id, "⚡ Memproses...").await?;

    let audio = match download(bot, voice.file.id.clone()).await {
        Ok(audio) => audio,
        Err(err) => {
            tracing::error!("voice download failed: {err}");
            bot.edit_message_text(chat_id, progress.id, "❌ Gagal mengunduh voice note.")
                .await?;
            return Ok(());
        }
    };

    let text = match cfg.engine.transcribe(audio, "voice.ogg").await {
        Ok(text) => text,
        Err(err) => {
            bot.edit_message_text(chat_id, progress.id, user_message_for_error(&err))
                .await?;
            return Ok(());
        }
    };
    bot.edit_message_text(chat_id, progress.id, format!("🗣️: \"{text}\""))
        .await?;

    commit_and_report(bot, chat_id, cfg, &text).await
}

async fn handle_photo(bot: &Bot, msg: &Message, cfg: &ConfigParameters) -> ResponseResult<()> {
    let chat_id = msg.chat.id;
    // The last size is the largest rendition.
    let Some(photo) = msg.photo().and_then(|sizes| sizes.last()) else {
        return Ok(());
    };

    let progress = bot.send_message(chat_id, "⚡ Memproses...").await?;

    let bytes = match download(bot, photo.file.id.clone()).await {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::error!("photo download failed: {err}");
            bot.edit_message_text(chat_id, progress.id, "❌ Gagal mengunduh foto.")
                .await?;
            return Ok(());
        }
    };

    let caption = msg.caption().unwrap_or_default();
    let image = ImageData::jpeg(bytes);
    let reply = match cfg
        .engine
        .commit(caption, Some(&image), Source::Telegram)
        .await
    {
        Ok(CommitOutcome::Saved {
            provider,
            transactions,
        }) => render_report(provider, Source::Telegram, &transactions),
        Ok(CommitOutcome::NoTransactions) => {
            "🤔 Maaf, saya tidak dapat menemukan detail transaksi dari data tersebut.".to_string()
        }
        Err(err) => user_message_for_error(&err),
    };
    bot.edit_message_text(chat_id, progress.id, reply).await?;
    Ok(())
}

async fn commit_and_report(
    bot: &Bot,
    chat_id: ChatId,
    cfg: &ConfigParameters,
    text: &str,
) -> ResponseResult<()> {
    let progress = bot.send_message(chat_id, "⚡ Memproses...").await?;

    let reply = match cfg.engine.commit(text, None, Source::Telegram).await {
        Ok(CommitOutcome::Saved {
            provider,
            transactions,
        }) => render_report(provider, Source::Telegram, &transactions),
        Ok(CommitOutcome::NoTransactions) => {
            "🤔 Maaf, saya tidak dapat menemukan detail transaksi dari data tersebut.".to_string()
        }
        Err(err) => user_message_for_error(&err),
    };
    bot.edit_message_text(chat_id, progress.id, reply).await?;
    Ok(())
}

async fn send_balance(bot: &Bot, chat_id: ChatId, cfg: &ConfigParameters) -> ResponseResult<()> {
    let progress = bot.send_message(chat_id, "🔍 Menghitung aset...").await?;
    let reply = match cfg.engine.balance_summary().await {
        Ok(summary) => ui::render_balance_report(&summary),
        Err(err) => user_message_for_error(&err),
    };
    bot.edit_message_text(chat_id, progress.id, reply).await?;
    Ok(())
}

async fn handle_undo(bot: &Bot, chat_id: ChatId, cfg: &ConfigParameters) -> ResponseResult<()> {
    let progress = bot
        .send_message(chat_id, "⏳ Undo transaksi terakhir...")
        .await?;
    let reply = match cfg.engine.undo_last().await {
        Ok(undone) => format!("✅ Undo: {} dihapus.", undone.description),
        Err(err) => user_message_for_error(&err),
    };
    bot.edit_message_text(chat_id, progress.id, reply).await?;
    Ok(())
}

async fn handle_reset(
    bot: &Bot,
    chat_id: ChatId,
    cfg: &ConfigParameters,
    confirmed: bool,
) -> ResponseResult<()> {
    if !confirmed {
        bot.send_message(
            chat_id,
            "⚠️ BAHAYA! Ketik /reset confirm untuk menghapus SEMUA data.",
        )
        .await?;
        return Ok(());
    }

    let progress = bot.send_message(chat_id, "⏳ Mereset database...").await?;
    let reply = match cfg.engine.reset().await {
        Ok(()) => "♻️ Database Bersih! (Header aman).".to_string(),
        Err(err) => user_message_for_error(&err),
    };
    bot.edit_message_text(chat_id, progress.id, reply).await?;
    Ok(())
}

async fn handle_set_balance(
    bot: &Bot,
    chat_id: ChatId,
    cfg: &ConfigParameters,
    account: &str,
    amount_raw: &str,
) -> ResponseResult<()> {
    // Validate before touching the ledger.
    let Some(target) = parse_amount(amount_raw) else {
        bot.send_message(chat_id, "❌ Jumlah uang harus angka.").await?;
        return Ok(());
    };

    let progress = bot.send_message(chat_id, "🧮 Menghitung selisih...").await?;
    let reply = match cfg.engine.set_balance(account, target).await {
        Ok(adjustment) => match &adjustment.entry {
            None => format!(
                "✅ Saldo {} sudah pas {}. Tidak ada perubahan.",
                adjustment.account,
                format_rupiah(adjustment.target)
            ),
            Some(entry) => format!(
                "✅ Saldo Disesuaikan!\nSaldo Lama: {}\nTarget: {}\nTindakan: Input {} {}",
                format_rupiah(adjustment.previous),
                format_rupiah(adjustment.target),
                entry.direction.as_str(),
                format_rupiah(entry.total_amount)
            ),
        },
        Err(err) => user_message_for_error(&err),
    };
    bot.edit_message_text(chat_id, progress.id, reply).await?;
    Ok(())
}

fn user_message_for_error(err: &EngineError) -> String {
    match err {
        EngineError::ProvidersExhausted { .. } => {
            "❌ Semua AI gagal memproses. Coba lagi nanti.".to_string()
        }
        EngineError::NoProvider => "❌ Tidak ada AI yang dikonfigurasi.".to_string(),
        EngineError::Parse(_) => {
            "🤔 Saya tidak mengerti. Apakah ini transaksi atau pertanyaan analisis?".to_string()
        }
        EngineError::Ledger(ledger_err) => {
            tracing::error!("ledger error: {ledger_err}");
            "❌ Koneksi database putus.".to_string()
        }
        EngineError::EmptyLedger => "⚠️ Data kosong (hanya header).".to_string(),
        EngineError::Config(config_err) => {
            tracing::error!("configuration error: {config_err}");
            "❌ Konfigurasi bermasalah.".to_string()
        }
    }
}
