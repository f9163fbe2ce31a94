use kerbo::{BufferHost, CpuOptions, Error, Session};

/// Ticks allowed before a case counts as hung.
const MAX_TICKS: usize = 10_000;

/// Execute `input` as one interpreter entry and tick until the mainline is
/// idle. Returns everything the script printed, fault reports included.
pub fn run(input: &str) -> Result<Vec<String>, Error> {
    let host = BufferHost::new();
    let mut session = Session::new(CpuOptions::default(), host.clone());
    session.execute(input)?;
    for _ in 0..MAX_TICKS {
        // Faults are reported through the host; the lines are the result.
        let _ = session.update(0.02);
        if session.is_idle() {
            return Ok(host.lines());
        }
    }
    panic!("script did not finish within {} ticks", MAX_TICKS);
}

macro_rules! script_case {
    ($name:ident, input: $input:expr, output: [$($line:expr),* $(,)?] $(,)?) => {
        #[test]
        fn $name() {
            let lines = $crate::cases::run($input).expect("script should compile");
            let expected: Vec<&str> = vec![$($line),*];
            pretty_assertions::assert_eq!(lines, expected);
        }
    };
    ($name:ident, input: $input:expr, error: $pattern:pat $(,)?) => {
        #[test]
        fn $name() {
            let result = $crate::cases::run($input);
            assert!(matches!(result, Err($pattern)), "got {:?}", result);
        }
    };
}
