#[macro_use]
mod cases;

script_case!(
    precedence,
    input: "print 1 + 2 * 3.",
    output: ["7"],
);

script_case!(
    parentheses,
    input: "print (1 + 2) * 3.",
    output: ["9"],
);

script_case!(
    division_is_floating_point,
    input: "print 7 / 2.",
    output: ["3.5"],
);

script_case!(
    power_binds_tighter_than_multiplication,
    input: "print 2 * 3 ^ 2.",
    output: ["18"],
);

script_case!(
    string_concatenation,
    input: "print \"T-\" + 10.",
    output: ["T-10"],
);

script_case!(
    string_case_is_kept,
    input: "PRINT \"MiXeD\".",
    output: ["MiXeD"],
);

script_case!(
    string_equality_ignores_case,
    input: "print \"abc\" = \"ABC\".",
    output: ["True"],
);

script_case!(
    keywords_and_names_ignore_case,
    input: "SET Speed TO 5. Print SPEED.",
    output: ["5"],
);

script_case!(
    not_equal,
    input: "print 1 <> 2. print 2 <> 2.",
    output: ["True", "False"],
);

script_case!(
    boolean_logic,
    input: "print true and false. print true or false.",
    output: ["False", "True"],
);

script_case!(
    unary_minus_inverts,
    input: "print -5. print -0.",
    output: ["0", "1"],
);

script_case!(
    math_functions,
    input: "print abs(2 - 5). print round(3.14159, 2). print max(2, 7).",
    output: ["3", "3.14", "7"],
);
