// Tests with valid programs for each rule in the grammar.

use crate::parser::{KerboScriptParser, Rule};
use pest::Parser;
use pest::iterators::Pair;

fn contains_rule(pair: Pair<Rule>, target: Rule) -> bool {
    if pair.as_rule() == target {
        return true;
    }
    for inner in pair.into_inner() {
        if contains_rule(inner, target) {
            return true;
        }
    }
    false
}

macro_rules! rule_examples {
    ( $($rule:ident => [$($program:expr),* $(,)?]),* $(,)? ) => {
        $(
            #[test]
            fn $rule() {
                let inputs = vec![$($program),*];
                for input in inputs {
                    let result = KerboScriptParser::parse(Rule::start, input)
                        .unwrap_or_else(|e| panic!("Failed to parse '{}': {}", input, e));
                    let root = result.into_iter().next().unwrap();
                    assert!(
                        contains_rule(root.clone(), Rule::$rule),
                        "Expected to find rule {:?} in parse tree for input '{}'",
                        Rule::$rule,
                        input
                    );
                }
            }
        )*
    };
}

rule_examples! {
    set_stmt => ["set x to 1.", "set ship:name to \"kerbal x\"."],
    if_stmt => ["if x > 1 print x.", "if true { print 1. }", "if a { } ."],
    until_stmt => ["until x > 10 { set x to x + 1. }", "until false break."],
    lock_stmt => ["lock throttle to 1.", "lock steering to heading(90, 45)."],
    unlock_stmt => ["unlock throttle.", "unlock all."],
    print_stmt => ["print 1.", "print \"hi\" at (1, 2)."],
    on_stmt => ["on ag1 { print 1. }", "on brakes print \"b\"."],
    toggle_stmt => ["toggle gear."],
    wait_stmt => ["wait 5.", "wait until altitude > 1000."],
    when_stmt => ["when altitude > 100 then { stage. }", "when x then print x."],
    onoff_stmt => ["lights on.", "sas off."],
    stage_stmt => ["stage."],
    clear_stmt => ["clearscreen."],
    add_stmt => ["add node."],
    remove_stmt => ["remove node."],
    log_stmt => ["log x to mylog.", "log \"a\" to \"out.txt\"."],
    break_stmt => ["until false { break. }"],
    declare_stmt => ["declare x.", "declare parameter a, b."],
    switch_stmt => ["switch to 1.", "switch to archive."],
    copy_stmt => ["copy prog from 0.", "copy prog to archive."],
    rename_stmt => ["rename a to b.", "rename file a to b.", "rename volume 1 to backup."],
    delete_stmt => ["delete prog.", "delete prog from 1."],
    run_stmt => ["run prog.", "run prog(1, 2).", "run prog on archive."],
    list_stmt => ["list.", "list files."],
    reboot_stmt => ["reboot."],
    shutdown_stmt => ["shutdown."],
    unset_stmt => ["unset x.", "unset all."],
    comparator => ["set x to a <> b.", "set x to a >= b.", "set x to a = b."],
    plusminus => ["set x to 1 - 2.", "set x to -y."],
    power => ["set x to 2 ^ 3."],
    and => ["set x to a and b."],
    or => ["set x to a or b."],
    sci_number => ["set x to 1e3.", "set x to 1.5e-2."],
    double => ["set x to 3.14.", "set x to .5."],
    boolean => ["set x to true.", "set x to false."],
    string_literal => ["print \"hello world\"."],
    arglist => ["print sin(30).", "print max(1, 2)."],
    varidentifier => ["print ship:velocity:surface."],
}
