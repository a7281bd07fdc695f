//! Hand-rolled slash-command parsing.

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Command {
    Start,
    Help,
    Undo,
    Reset { confirmed: bool },
    SetBalance { account: String, amount_raw: String },
    /// `/setsaldo` with missing arguments. Answered with a format hint.
    SetBalanceUsage,
    /// Any other `/`-prefixed text. Never forwarded to the extractor.
    Unknown,
}

pub(crate) fn parse_command(text: &str) -> Option<Command> {
    let trimmed = text.trim();
    if !trimmed.starts_with('/') {
        return None;
    }
    let mut parts = trimmed.split_whitespace();
    let cmd = parts.next().unwrap_or("");

    match cmd {
        "/start" | "/menu" => Some(Command::Start),
        "/help" => Some(Command::Help),
        "/undo" => Some(Command::Undo),
        "/reset" => Some(Command::Reset {
            confirmed: parts
                .next()
                .is_some_and(|arg| arg.eq_ignore_ascii_case("confirm")),
        }),
        "/setsaldo" => match (parts.next(), parts.next()) {
            (Some(account), Some(amount_raw)) => Some(Command::SetBalance {
                account: account.to_string(),
                amount_raw: amount_raw.to_string(),
            }),
            _ => Some(Command::SetBalanceUsage),
        },
        _ => Some(Command::Unknown),
    }
}

/// Parse the `/setsaldo` amount. Thousand separators are tolerated.
pub(crate) fn parse_amount(raw: &str) -> Option<i64> {
    let cleaned = raw.replace(['.', ','], "");
    cleaned.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_maintenance_commands() {
        assert_eq!(parse_command("/start"), Some(Command::Start));
        assert_eq!(parse_command("/menu"), Some(Command::Start));
        assert_eq!(parse_command("/undo"), Some(Command::Undo));
        assert_eq!(
            parse_command("/reset"),
            Some(Command::Reset { confirmed: false })
        );
        assert_eq!(
            parse_command("/reset confirm"),
            Some(Command::Reset { confirmed: true })
        );
    }

    #[test]
    fn parses_setsaldo_with_both_arguments() {
        assert_eq!(
            parse_command("/setsaldo BCA 1500000"),
            Some(Command::SetBalance {
                account: "BCA".to_string(),
                amount_raw: "1500000".to_string(),
            })
        );
    }

    #[test]
    fn setsaldo_missing_arguments_asks_for_format() {
        // Must parse as a command: "/setsaldo BCA" contains "saldo" and
        // would otherwise be routed as a balance-summary keyword.
        assert_eq!(
            parse_command("/setsaldo BCA"),
            Some(Command::SetBalanceUsage)
        );
        assert_eq!(parse_command("/setsaldo"), Some(Command::SetBalanceUsage));
    }

    #[test]
    fn slash_text_never_falls_through_to_free_text() {
        assert_eq!(parse_command("/unknown"), Some(Command::Unknown));
        assert_eq!(parse_command("/analisa bulan ini"), Some(Command::Unknown));
    }

    #[test]
    fn plain_text_is_not_a_command() {
        assert_eq!(parse_command("beli kopi 18rb"), None);
    }

    #[test]
    fn amounts_tolerate_separators() {
        assert_eq!(parse_amount("1500000"), Some(1_500_000));
        assert_eq!(parse_amount("1.500.000"), Some(1_500_000));
        assert_eq!(parse_amount("1,500,000"), Some(1_500_000));
        assert_eq!(parse_amount("-25.000"), Some(-25_000));
        assert_eq!(parse_amount("sejuta"), None);
    }
}
