//! Prompt construction for the comprehension-time estimate.
//!
//! The template fixes the persona (a junior developer with basic Java but no
//! Apache Hive experience), embeds the source verbatim in a fenced block, and
//! pins the output contract to a bare JSON object so the constrained decoding
//! on the server side has an unambiguous target.

/// Build the estimation prompt for one piece of source code.
///
/// Pure and deterministic: the same `code` always produces the same prompt,
/// so all repeat attempts for a row share identical input.
#[must_use]
pub fn build(code: &str) -> String {
    format!(
        "You are simulating a junior developer who has:\n\
         - **Basic knowledge of Java (syntax, classes, functions, control structures, basic OOP)**\n\
         - **No prior knowledge of Apache Hive or its libraries**\n\
         \n\
         I will give you a piece of Java code that uses Apache Hive.\n\
         Estimate, as precisely as possible, how many **seconds** this junior developer would need to fully understand the code.\n\
         \"Understanding\" means:\n\
         - They can explain what the code does overall\n\
         - They can follow what each class/method does\n\
         \n\
         Here is the code:\n\
         ```java\n\
         {code}\n\
         ```\n\
         \n\
         DO NOT GREET, THINK, OR REASON. NO OTHER TEXT.\n\
         Return **only** a json object. Do not output anything else."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_idempotent() {
        let code = "public class Foo { void bar() {} }";
        assert_eq!(build(code), build(code));
    }

    #[test]
    fn test_build_embeds_code_in_fenced_block() {
        let prompt = build("SELECT_STMT.execute();");
        assert!(prompt.contains("```java\nSELECT_STMT.execute();\n```"));
    }

    #[test]
    fn test_build_states_persona_and_contract() {
        let prompt = build("x");
        assert!(prompt.starts_with("You are simulating a junior developer"));
        assert!(prompt.contains("No prior knowledge of Apache Hive"));
        assert!(prompt.ends_with("Return **only** a json object. Do not output anything else."));
    }

    #[test]
    fn test_build_distinct_for_distinct_code() {
        assert_ne!(build("class A {}"), build("class B {}"));
    }
}
