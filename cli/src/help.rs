pub const CONFIG_FILE: &str = r#"Config file for relex

Specifies a TOML config file with the capacity limits used while compiling
rules. If config file is not specified, ${HOME}/.relex.toml is used. If it
does not exist the default limits are applied.

Example:

[limits]
max_nfa_states = 768
max_dfa_states = 254
max_macro_depth = 32
max_action_bytes = 10240
max_macros = 512"#;

pub const RULES_PATH_LONG_HELP: &str = r#"Path to a lex source file

The file contains macro definitions, followed by a line with `%%`, followed
by the rules, one per line. Each rule is a regular expression followed by
whitespace and the action. Anything after a second `%%` line is ignored.
A file without `%%` lines contains only rules.

Example:

D    [0-9]
%%
{D}+           return ICON;
{D}*\.{D}+     return FCON;"#;

pub const COMPILED_RULES_LONG_HELP: &str = r#"Indicate that <RULES_PATH> is a compiled DFA

Rules can be compiled with the `relex compile` command. The file produced by
this command can be passed later to `relex run` by using this flag."#;
