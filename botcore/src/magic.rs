/// Name of the environment variable containing the path to the prover settings file.
/// If not set, defaults to
///  (1) on Linux and macOS: `$XDG_CONFIG_HOME/botcore/settings.toml` or `$HOME/.config/botcore/settings.toml`
///  (2) on Windows: `%APPDATA%\botcore\settings.toml`
pub const ENV_SETTINGS_PATH: &str = "BOTCORE_CONFIG_PATH";

/// Upper bound on the variable permutations tried by the elimination search.
pub const MAX_PERMUTATIONS: usize = 8;

/// Coordinates used to fix the first free points: `A = (0,0)`, `B = (0,1)`.
pub const FIX_COORDINATES: [i64; 4] = [0, 0, 0, 1];

/// Readability of an `AreEqual` condition obtained by merging `xAreEqual` and `yAreEqual`.
pub const MERGED_EQUALITY_READABILITY: f64 = 0.5;

/// Answers of the real geometry services that mean "no usable result".
pub const REALGEOM_ERROR_SENTINELS: [&str; 5] = [
    "$Aborted",
    "$Failed",
    "GIAC ERROR",
    "QEPCAD ERROR",
    "TARSKI ERROR",
];

/// Answer of the general algebra evaluator when it could not evaluate an input.
pub const CAS_FAILURE: &str = "?";

/// Probe sent to the general algebra evaluator before any proof attempt.
pub const CAS_PROBE: (&str, &str) = ("1+1", "2");

/// Expected answers of the real geometry web service connection test.
pub const REALGEOM_TEST_ANSWERS: [&str; 2] = ["m>(3/2)", "m > 3/2"];

/// Requests longer than this are sent with POST instead of GET.
pub const REALGEOM_MAX_GET_LENGTH: usize = 2000;

/// Default number of fixed coordinates of the local quantifier elimination.
pub const LOCAL_QE_FIXCOORDS: usize = 4;

/// Command of the real geometry services deciding and exploring inequalities.
pub const REALGEOM_COMMAND: &str = "euclideansolver";

/// Coordinates fixed by the direct elimination of a comparison: `(0,0)` and `(1,0)`.
pub const COMPARE_FIX_COORDINATES: [i64; 4] = [0, 0, 1, 0];
