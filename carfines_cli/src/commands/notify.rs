use anyhow::{Context, Result};
use clap::{ArgAction, Args};
use carfines_lib::{
    BuenosAiresClient, CapitalFederalClient, Config, Dispatcher, Portal, PortalConfig,
    PortalSelection, TelegramChannel, TwoCaptchaSolver,
};
use carfines_lib::validation;

#[derive(Args)]
pub struct NotifyArgs {
    /// Plate number to look up (e.g. ABC123 or AB123CD)
    #[arg(short = 'p', long, visible_alias = "plateNumber")]
    pub plate_number: String,

    /// Query the Capital Federal (CABA) portal
    #[arg(
        long,
        action = ArgAction::Set,
        default_value_t = true,
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    pub caba: bool,

    /// Query the Buenos Aires province portal
    #[arg(
        long,
        action = ArgAction::Set,
        default_value_t = true,
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    pub ba: bool,
}

impl NotifyArgs {
    fn selection(&self) -> PortalSelection {
        PortalSelection {
            capital_federal: self.caba,
            buenos_aires: self.ba,
        }
    }
}

pub async fn run(args: &NotifyArgs) -> Result<()> {
    let plate = validation::normalize_plate(&args.plate_number)?;
    let config = Config::from_env(args.selection())?;

    let portals = build_portals(&config)?;
    tracing::info!("Looking up {} on {} portal(s)", plate, portals.len());

    let telegram = match &config.telegram.api_url {
        Some(url) => TelegramChannel::with_base_url(
            url,
            config.telegram.bot_token.clone(),
            config.telegram.chat_id,
        )?,
        None => TelegramChannel::new(config.telegram.bot_token.clone(), config.telegram.chat_id)?,
    };
    telegram
        .verify()
        .await
        .context("Telegram bot token could not be verified")?;

    let dispatcher = Dispatcher::new(telegram);
    carfines_lib::notify(&plate, &portals, &dispatcher)
        .await
        .context("failed to deliver report")?;

    Ok(())
}

/// Capital Federal goes first, matching the report order users are used to.
fn build_portals(config: &Config) -> Result<Vec<Portal<TwoCaptchaSolver>>> {
    let mut portals: Vec<Portal<TwoCaptchaSolver>> = Vec::new();

    if let Some(caba) = &config.capital_federal {
        let solver = solver_for(config, caba)?;
        portals.push(CapitalFederalClient::new(&caba.base_url, &caba.api_url, solver).into());
    }
    if let Some(ba) = &config.buenos_aires {
        let solver = solver_for(config, ba)?;
        portals.push(BuenosAiresClient::new(&ba.api_url, solver).into());
    }

    Ok(portals)
}

fn solver_for(config: &Config, portal: &PortalConfig) -> Result<TwoCaptchaSolver> {
    let api_key = config.captcha_api_key.clone();
    let site_key = portal.captcha_site_key.clone();
    let page_url = portal.base_url.clone();

    let solver = match &config.captcha_base_url {
        Some(base) => TwoCaptchaSolver::with_base_url(base, api_key, site_key, page_url)?,
        None => TwoCaptchaSolver::new(api_key, site_key, page_url)?,
    };
    Ok(solver)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: NotifyArgs,
    }

    fn parse(argv: &[&str]) -> NotifyArgs {
        TestCli::try_parse_from(std::iter::once("car-tickets-notifier").chain(argv.iter().copied()))
            .unwrap()
            .args
    }

    #[test]
    fn both_portals_enabled_by_default() {
        let args = parse(&["-p", "ABC123"]);
        assert_eq!(args.plate_number, "ABC123");
        assert!(args.caba);
        assert!(args.ba);
    }

    #[test]
    fn portals_can_be_disabled() {
        let args = parse(&["--plate-number", "ABC123", "--caba", "false"]);
        assert!(!args.caba);
        assert!(args.ba);

        let args = parse(&["--plateNumber", "ABC123", "--ba=false"]);
        assert!(args.caba);
        assert!(!args.ba);
    }

    #[test]
    fn bare_flag_means_enabled() {
        let args = parse(&["-p", "ABC123", "--ba"]);
        assert!(args.ba);
    }

    #[test]
    fn plate_is_required() {
        assert!(TestCli::try_parse_from(["car-tickets-notifier"]).is_err());
    }

    #[test]
    fn portals_are_built_in_report_order() {
        let portal = |site: &str| PortalConfig {
            captcha_site_key: site.to_string(),
            base_url: format!("https://{}.example", site),
            api_url: format!("https://{}.example/api", site),
        };
        let config = Config {
            captcha_api_key: "key".to_string(),
            captcha_base_url: Some("http://127.0.0.1:1".to_string()),
            capital_federal: Some(portal("caba")),
            buenos_aires: Some(portal("ba")),
            telegram: carfines_lib::TelegramConfig {
                bot_token: "t".to_string(),
                chat_id: 1,
                api_url: None,
            },
        };
        let names: Vec<String> = build_portals(&config)
            .unwrap()
            .iter()
            .map(|p| carfines_lib::TicketSource::name(p).to_string())
            .collect();
        assert_eq!(names, vec!["Capital Federal", "Buenos Aires"]);
    }
}
