//! Interactive strategy selection.

use crate::config::SupervisionStrategy;
use crate::error::Result;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Select;

const CHOICES: [(&str, SupervisionStrategy); 2] = [
    ("Direct (separate terminals)", SupervisionStrategy::Direct),
    ("Managed (pm2)", SupervisionStrategy::Managed),
];

/// Asks the operator which supervision strategy to use.
pub fn choose_strategy() -> Result<SupervisionStrategy> {
    let theme = ColorfulTheme::default();
    let items: Vec<&str> = CHOICES.iter().map(|(label, _)| *label).collect();
    let selection = Select::with_theme(&theme)
        .with_prompt("How should the services be started?")
        .items(&items)
        .default(0)
        .interact()?;
    Ok(CHOICES[selection].1)
}

/// Picks the strategy from the command line, then the configuration, and
/// only asks when neither names one.
pub fn resolve_strategy<F>(
    flag: Option<SupervisionStrategy>,
    configured: Option<SupervisionStrategy>,
    ask: F,
) -> Result<SupervisionStrategy>
where
    F: FnOnce() -> Result<SupervisionStrategy>,
{
    match flag.or(configured) {
        Some(strategy) => Ok(strategy),
        None => ask(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn never_asked() -> Result<SupervisionStrategy> {
        panic!("prompt should not be shown");
    }

    #[test]
    fn test_flag_wins() {
        let strategy = resolve_strategy(
            Some(SupervisionStrategy::Managed),
            Some(SupervisionStrategy::Direct),
            never_asked,
        )
        .unwrap();
        assert_eq!(strategy, SupervisionStrategy::Managed);
    }

    #[test]
    fn test_config_default() {
        let strategy =
            resolve_strategy(None, Some(SupervisionStrategy::Direct), never_asked).unwrap();
        assert_eq!(strategy, SupervisionStrategy::Direct);
    }

    #[test]
    fn test_prompt_fallback() {
        let strategy =
            resolve_strategy(None, None, || Ok(SupervisionStrategy::Managed)).unwrap();
        assert_eq!(strategy, SupervisionStrategy::Managed);
    }
}
