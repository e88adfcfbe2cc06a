//! 요청별 작업 디렉토리
//!
//! ```text
//! <temp_root>/copapatch-XXXXXX/
//!   reports/       # 플랫폼별 스캔 리포트
//!   vex.json       # 패처가 생성하는 VEX 문서
//! ```
//!
//! 이름은 요청마다 고유하므로 동시 요청끼리 충돌하지 않습니다. 정상 종료 시
//! [`Workspace::cleanup`]으로 삭제하며, 에러 경로에서는 drop 될 때 삭제됩니다.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, warn};

use crate::error::EngineError;

const WORKSPACE_PREFIX: &str = "copapatch-";
const REPORTS_DIR: &str = "reports";
const VEX_FILE: &str = "vex.json";

/// 요청 하나의 임시 작업 디렉토리
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// 작업 디렉토리와 `reports/` 를 만듭니다.
    ///
    /// `root` 가 `None` 이면 시스템 임시 디렉토리 아래에 만듭니다.
    pub fn create(root: Option<&Path>) -> Result<Self, EngineError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(WORKSPACE_PREFIX);
        let dir = match root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
        .map_err(EngineError::Workspace)?;

        std::fs::create_dir(dir.path().join(REPORTS_DIR)).map_err(EngineError::Workspace)?;
        debug!(path = %dir.path().display(), "created workspace");
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// 스캔 리포트 디렉토리
    pub fn reports_dir(&self) -> PathBuf {
        self.dir.path().join(REPORTS_DIR)
    }

    /// VEX 출력 경로
    pub fn vex_path(&self) -> PathBuf {
        self.dir.path().join(VEX_FILE)
    }

    /// 작업 디렉토리를 삭제합니다. 실패는 경고로만 남깁니다.
    pub fn cleanup(self) {
        let path = self.dir.path().to_path_buf();
        match self.dir.close() {
            Ok(()) => debug!(path = %path.display(), "removed workspace"),
            Err(e) => warn!(path = %path.display(), error = %e, "failed to remove workspace"),
        }
    }
}
