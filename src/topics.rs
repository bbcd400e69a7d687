//! Topic configuration: match keywords and default code per topic.
//!
//! A `TopicTable` can only be built from a function over every `Topic`, so the
//! mapping is total by construction.

use std::collections::HashMap;

use crate::domain::{CodeSnippet, Topic};

/// Last tier of the code fallback chain.
pub const FALLBACK_INITIAL: &str = "// Code implementation varies based on context.\n// See solution for best practices.";
pub const FALLBACK_SOLUTION: &str = "// Best practice implementation\nclass Example {\n  execute() {\n    console.log(\"Clean Code Applied\");\n  }\n}";

pub fn fallback_snippet() -> CodeSnippet {
  CodeSnippet { initial: FALLBACK_INITIAL.into(), solution: FALLBACK_SOLUTION.into() }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TopicConfig {
  pub keywords: Vec<String>,
  pub code_defaults: Option<CodeSnippet>,
}

#[derive(Clone, Debug)]
pub struct TopicTable {
  configs: HashMap<Topic, TopicConfig>,
}

impl TopicTable {
  pub fn from_fn(mut f: impl FnMut(Topic) -> TopicConfig) -> Self {
    let configs = Topic::ALL.iter().map(|&t| (t, f(t))).collect();
    Self { configs }
  }

  pub fn builtin() -> Self {
    Self::from_fn(builtin_config)
  }

  pub fn get(&self, topic: Topic) -> &TopicConfig {
    // from_fn fills every topic
    &self.configs[&topic]
  }
}

fn builtin_config(topic: Topic) -> TopicConfig {
  let keywords: &[&str] = match topic {
    Topic::CleanCode => &["clean code", "principles", "smell", "career"],
    Topic::DesignPatterns => &[
      "design patterns", "creational", "structural", "behavioral", "singleton", "factory",
      "observer", "strategy", "adapter", "facade", "proxy", "command",
    ],
    Topic::Refactoring => &["refactoring", "clean code", "smell"],
    Topic::Architecture => &["architecture", "di", "clean", "layer"],
    Topic::Solid => &["solid", "srp", "ocp", "lsp", "isp", "dip"],
    Topic::ReactPatterns => &["react"],
    Topic::Angular => &["angular", "rxjs", "signals"],
    Topic::Typescript => &["typescript", "generics", "types"],
  };

  let code_defaults = match topic {
    Topic::ReactPatterns => snippet(
      "// ❌ Prop Drilling (Bad)\nconst Parent = () => {\n  const [user, setUser] = useState(null);\n  return <Child user={user} />;\n};\n\nconst Child = ({ user }) => <GrandChild user={user} />;",
      "// ✅ Context API / Composition (Good)\nconst UserContext = createContext();\n\nconst Parent = () => {\n  return (\n    <UserContext.Provider value={user}>\n       <Child />\n    </UserContext.Provider>\n  );\n};",
    ),
    Topic::Angular => snippet(
      "// ❌ RxJS for synchronous state\ncount$ = new BehaviorSubject(0);\n\nincrement() {\n  this.count$.next(this.count$.value + 1);\n}",
      "// ✅ Angular Signals (Modern)\ncount = signal(0);\n\nincrement() {\n  this.count.update(c => c + 1);\n}",
    ),
    Topic::Typescript => snippet(
      "// ❌ Using 'any' loses type safety\nfunction processData(data: any) {\n  return data.value;\n}",
      "// ✅ Generics preserve types\nfunction processData<T>(data: T): T {\n  return data;\n}",
    ),
    Topic::CleanCode
    | Topic::DesignPatterns
    | Topic::Refactoring
    | Topic::Architecture
    | Topic::Solid => fallback_snippet(),
  };

  TopicConfig {
    keywords: keywords.iter().map(|k| k.to_string()).collect(),
    code_defaults: Some(code_defaults),
  }
}

fn snippet(initial: &str, solution: &str) -> CodeSnippet {
  CodeSnippet { initial: initial.into(), solution: solution.into() }
}
