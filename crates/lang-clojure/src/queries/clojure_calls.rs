cljscope_core::decl_indices!(CallIndices, {
    call => "call",
    head => "call.head",
});

pub const CLOJURE_CALLS_SCM: &str = include_str!("clojure_calls.scm");
