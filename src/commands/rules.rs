use yakabot_channel_adapter::config::{
    default_first_name, default_last_name, default_login, ENV_FIRST_NAME, ENV_FULL_NAME,
    ENV_LAST_NAME, ENV_LOGIN,
};
use yakabot_responder::{initial_table, BotNames};

/// Print the starting rule table. Needs no server and no secret.
pub fn run() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let names = names_from(|key| std::env::var(key).ok());
    print!("{}", initial_table(&names).list());
    Ok(())
}

fn names_from<F>(lookup: F) -> BotNames
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
    let first_name = get(ENV_FIRST_NAME).unwrap_or_else(default_first_name);
    let last_name = get(ENV_LAST_NAME).unwrap_or_else(default_last_name);
    BotNames {
        login: get(ENV_LOGIN).unwrap_or_else(default_login),
        full_name: get(ENV_FULL_NAME).unwrap_or_else(|| format!("{}{}", first_name, last_name)),
        first_name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_environment() {
        let names = names_from(|_| None);
        assert_eq!(names.login, "yakafokon");
        assert_eq!(names.first_name, "Yakafokon");
        assert_eq!(names.full_name, "YakafokonBot");
    }

    #[test]
    fn explicit_full_name_wins() {
        let names = names_from(|key| (key == ENV_FULL_NAME).then(|| "Robo".to_string()));
        assert_eq!(names.full_name, "Robo");
    }
}
