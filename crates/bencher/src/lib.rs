#[derive(Debug, Copy, Clone)]
pub struct TestCase {
    name: &'static str,
    group: TestGroup,
    file: TestFile,
    content_type: &'static str,
}

impl TestCase {
    pub fn new(name: &'static str, group: TestGroup, file: TestFile, content_type: &'static str) -> Self {
        Self { name, group, file, content_type }
    }

    pub fn small(name: &'static str, file: TestFile, content_type: &'static str) -> Self {
        Self::new(name, TestGroup::Small, file, content_type)
    }

    pub fn large(name: &'static str, file: TestFile, content_type: &'static str) -> Self {
        Self::new(name, TestGroup::Large, file, content_type)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn group(&self) -> TestGroup {
        self.group
    }

    pub fn file(&self) -> &TestFile {
        &self.file
    }

    /// The `Content-Type` header the body is sent with.
    pub fn content_type(&self) -> &'static str {
        self.content_type
    }

    pub fn len(&self) -> u64 {
        self.file.content.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.file.content.is_empty()
    }
}

#[derive(Debug, Copy, Clone)]
pub struct TestFile {
    file_name: &'static str,
    content: &'static str,
}

impl TestFile {
    pub const fn new(file_name: &'static str, content: &'static str) -> Self {
        Self { file_name, content }
    }

    pub fn content(&self) -> &'static str {
        self.content
    }

    pub fn file_name(&self) -> &'static str {
        self.file_name
    }
}

#[derive(Clone, Copy, Debug)]
pub enum TestGroup {
    Small,
    Large,
}
