/// Leading `and` / `or` of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Condition {
    #[default]
    None,
    And, // run only if the previous job succeeded
    Or,  // run only if the previous job failed
}

impl Condition {
    pub fn from_word(word: &str) -> Option<Condition> {
        match word {
            "and" => Some(Condition::And),
            "or" => Some(Condition::Or),
            _ => None,
        }
    }

    /// Whether a job carrying this condition runs after a job that ended
    /// with `last_status`.
    pub fn should_run(self, last_status: i32) -> bool {
        match self {
            Condition::None => true,
            Condition::And => last_status == 0,
            Condition::Or => last_status != 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectKind {
    In,
    Out,
}

/// One stage of a pipeline. Never empty: `argv[0]` is the command name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessSpec {
    argv: Vec<String>,
}

impl ProcessSpec {
    /// Returns `None` for an empty argument list.
    pub fn new(argv: Vec<String>) -> Option<Self> {
        if argv.is_empty() {
            None
        } else {
            Some(ProcessSpec { argv })
        }
    }

    pub fn name(&self) -> &str {
        &self.argv[0]
    }

    pub fn args(&self) -> &[String] {
        &self.argv[1..]
    }

    pub fn argv(&self) -> &[String] {
        &self.argv
    }
}

/// Everything one input line asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub stages: Vec<ProcessSpec>,
    pub input: Option<String>,
    pub output: Option<String>,
    pub condition: Condition,
}

impl Job {
    #[cfg(test)]
    pub fn simple(spec: ProcessSpec) -> Self {
        Job {
            stages: vec![spec],
            input: None,
            output: None,
            condition: Condition::None,
        }
    }

    pub fn is_pipeline(&self) -> bool {
        self.stages.len() > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_should_run() {
        assert!(Condition::None.should_run(0));
        assert!(Condition::None.should_run(3));
        assert!(Condition::And.should_run(0));
        assert!(!Condition::And.should_run(1));
        assert!(!Condition::Or.should_run(0));
        assert!(Condition::Or.should_run(127));
    }

    #[test]
    fn test_process_spec_rejects_empty() {
        assert!(ProcessSpec::new(vec![]).is_none());
        let spec = ProcessSpec::new(vec!["ls".into(), "-l".into()]).unwrap();
        assert_eq!(spec.name(), "ls");
        assert_eq!(spec.args(), ["-l".to_string()]);
    }
}
