pub mod clojure_calls;
