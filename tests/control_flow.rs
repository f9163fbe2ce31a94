#[macro_use]
mod cases;

use indoc::indoc;
use kerbo::Error;

script_case!(
    if_skips_body,
    input: "set x to 1. if x > 5 { print \"big\". } print \"end\".",
    output: ["end"],
);

script_case!(
    if_runs_body,
    input: "set x to 9. if x > 5 print \"big\". print \"end\".",
    output: ["big", "end"],
);

script_case!(
    until_loop,
    input: "set i to 0. until i >= 3 { print i. set i to i + 1. }",
    output: ["0", "1", "2"],
);

script_case!(
    break_leaves_loop,
    input: "set i to 0. until false { set i to i + 1. if i = 3 break. } print i.",
    output: ["3"],
);

script_case!(
    break_leaves_only_inner_loop,
    input: indoc! {"
        set n to 0. set i to 0.
        until i >= 3 {
            set i to i + 1.
            set j to 0.
            until false { set j to j + 1. set n to n + 1. if j >= 2 break. }
        }
        print n."},
    output: ["6"],
);

script_case!(
    break_outside_loop,
    input: "print 1. break.",
    error: Error::Compile { .. },
);

script_case!(
    lock_is_reevaluated,
    input: "lock double to x * 2. set x to 4. print double. set x to 5. print double.",
    output: ["8", "10"],
);

script_case!(
    wait_resumes,
    input: "print 1. wait 0.5. print 2.",
    output: ["1", "2"],
);

script_case!(
    when_fires_while_mainline_loops,
    input: indoc! {r#"
        set t to 0.
        when t > 2 then print "fired".
        until t > 5 { set t to t + 1. wait 0.1. }
        print "done"."#},
    output: ["fired", "done"],
);

script_case!(
    wait_until_trigger,
    input: "set t to 0. when true then set t to t + 1. wait until t > 0. print \"go\".",
    output: ["go"],
);
