//! The conversational rules the bot starts with.

use crate::rule::Response;
use crate::table::RuleTable;

/// Names the bot answers to in the liveness rule.
#[derive(Debug, Clone)]
pub struct BotNames {
    pub login: String,
    pub first_name: String,
    pub full_name: String,
}

fn static_rules(names: &BotNames) -> Vec<(String, &'static str)> {
    let login = regex::escape(&names.login);
    let first = regex::escape(&names.first_name);
    let full = regex::escape(&names.full_name);

    vec![
        (
            format!(
                r"(?:^|\W)({})|({})|({}).+(alive)|(vivant)|(mort)(?:$|\W)",
                login, first, full
            ),
            "Yes I'm alive",
        ),
        (
            r"(?:^|\W)((H|h)ello)|((S|s)alut)|((B|b)onjour)|((B|b)onsoir)(?:$|\W)".to_string(),
            "Bonjour",
        ),
        (
            r"(?:^|\W)perdu(?:$|\W)".to_string(),
            "Êtes-vous perdu ? http://perdu.com/",
        ),
        (
            r"(?:^|\W)Il faudrait que(?:$|\W)".to_string(),
            "Pourquoi pas ? Mais surtout pourquoi ne pas le [faire toi-même](http://yakafokon.detected.fr/) ?",
        ),
        (
            r"(?:^|\W)Tu devrais(?:$|\W)".to_string(),
            "Ben tiens, ça tombe bien, j'avais que ça à faire.\nhttp://yakafokon.detected.fr/ ",
        ),
        (
            r"(?:^|\W)Il n'y a qu'à(?:$|\W)".to_string(),
            "T'as raison, Mmmhh, tu t'en occupe ? \nhttp://yakafokon.detected.fr/",
        ),
        (
            r"(?:^|\W)Il faut qu'on(?:$|\W)".to_string(),
            "C'est celui-qui dit [qui fait](http://yakafokon.detected.fr/) ?",
        ),
    ]
}

/// Built-ins followed by the conversational rules.
pub fn initial_table(names: &BotNames) -> RuleTable {
    let mut table = RuleTable::with_builtins();
    let entries = static_rules(names)
        .into_iter()
        .map(|(pattern, answer)| (pattern, Response::Static(answer.to_string())));
    let skipped = table.extend_lossy(entries);
    tracing::info!(rules = table.len(), skipped, "Rule table initialised");
    table
}
