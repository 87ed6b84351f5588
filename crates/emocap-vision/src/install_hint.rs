//! 캡처 도구 설치 안내 문구.
//!
//! Linux에서는 배포판을 추정하여 알맞은 패키지 매니저 명령을 안내한다.
//! 추정 결과는 안내 문구에만 쓰이며 캡처 흐름에는 영향을 주지 않는다.
//!
//! 수집(`gather_distro_probe`)과 문구 생성(`linux_install_hint`)을 분리하여
//! 문구 생성은 실제 OS 조회 없이 테스트할 수 있다.

use emocap_core::ports::command::{CommandRunner, CommandSpec};
use std::path::Path;
use tracing::debug;

/// 캡처 도구 실행 파일 이름
pub const CAPTURE_TOOL: &str = "ffmpeg";

const MISSING_PREFIX: &str = "FFmpeg is not installed.";

/// macOS 설치 안내
pub fn macos_install_hint() -> String {
    format!("{MISSING_PREFIX} Install it with Homebrew: brew install ffmpeg")
}

/// Windows 설치 안내
pub fn windows_install_hint() -> String {
    format!(
        "{MISSING_PREFIX} Install it with: winget install Gyan.FFmpeg (or: choco install ffmpeg), \
         or download it from https://ffmpeg.org/download.html and add it to PATH"
    )
}

/// 패키지 매니저
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    Apt,
    Dnf,
    Yum,
    Pacman,
    Zypper,
    Emerge,
    Apk,
}

impl PackageManager {
    /// 배포판 감지 실패 시 직접 탐지하는 순서
    pub const PROBE_ORDER: [PackageManager; 5] = [
        PackageManager::Apt,
        PackageManager::Dnf,
        PackageManager::Yum,
        PackageManager::Pacman,
        PackageManager::Zypper,
    ];

    pub fn binary(&self) -> &'static str {
        match self {
            PackageManager::Apt => "apt",
            PackageManager::Dnf => "dnf",
            PackageManager::Yum => "yum",
            PackageManager::Pacman => "pacman",
            PackageManager::Zypper => "zypper",
            PackageManager::Emerge => "emerge",
            PackageManager::Apk => "apk",
        }
    }

    pub fn install_command(&self) -> &'static str {
        match self {
            PackageManager::Apt => "sudo apt update && sudo apt install -y ffmpeg",
            PackageManager::Dnf => "sudo dnf install -y ffmpeg",
            PackageManager::Yum => "sudo yum install -y ffmpeg",
            PackageManager::Pacman => "sudo pacman -S ffmpeg",
            PackageManager::Zypper => "sudo zypper install ffmpeg",
            PackageManager::Emerge => "sudo emerge media-video/ffmpeg",
            PackageManager::Apk => "sudo apk add ffmpeg",
        }
    }
}

/// 배포판 계열
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistroFamily {
    Debian,
    Fedora,
    OpenSuse,
    Arch,
    Gentoo,
    Alpine,
}

impl DistroFamily {
    /// 판별 순서와 각 계열의 식별 키워드
    const KEYWORDS: [(DistroFamily, &'static [&'static str]); 6] = [
        (DistroFamily::Debian, &["debian", "ubuntu", "mint"]),
        (
            DistroFamily::Fedora,
            &["fedora", "centos", "rhel", "red hat", "rocky", "alma"],
        ),
        (DistroFamily::OpenSuse, &["opensuse", "suse"]),
        (DistroFamily::Arch, &["arch", "manjaro"]),
        (DistroFamily::Gentoo, &["gentoo"]),
        (DistroFamily::Alpine, &["alpine"]),
    ];

    /// 배포판 식별 텍스트에서 계열 추정 (대소문자 무시)
    pub fn detect(text: &str) -> Option<Self> {
        let text = text.to_lowercase();
        Self::KEYWORDS
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| text.contains(k)))
            .map(|(family, _)| *family)
    }

    pub fn package_manager(&self) -> PackageManager {
        match self {
            DistroFamily::Debian => PackageManager::Apt,
            DistroFamily::Fedora => PackageManager::Dnf,
            DistroFamily::OpenSuse => PackageManager::Zypper,
            DistroFamily::Arch => PackageManager::Pacman,
            DistroFamily::Gentoo => PackageManager::Emerge,
            DistroFamily::Alpine => PackageManager::Apk,
        }
    }
}

/// Linux 환경 조회 결과
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DistroProbe {
    /// 수집한 배포판 식별 텍스트 (os-release, lsb_release, *-release 순)
    pub distro_texts: Vec<String>,
    /// 직접 탐지된 패키지 매니저 (PROBE_ORDER 순)
    pub package_managers: Vec<PackageManager>,
}

impl DistroProbe {
    /// 수집된 텍스트 중 처음으로 판별되는 계열
    pub fn family(&self) -> Option<DistroFamily> {
        self.distro_texts.iter().find_map(|t| DistroFamily::detect(t))
    }
}

/// 조회 결과 → 설치 안내 문구
pub fn linux_install_hint(probe: &DistroProbe) -> String {
    if let Some(family) = probe.family() {
        return format!(
            "{MISSING_PREFIX} Install it with: {}",
            family.package_manager().install_command()
        );
    }

    if let Some(pm) = probe.package_managers.first() {
        return format!("{MISSING_PREFIX} Install it with: {}", pm.install_command());
    }

    format!("{MISSING_PREFIX} Please install ffmpeg using your distribution's package manager.")
}

/// Linux 배포판 정보 수집
///
/// 1. `<etc>/os-release`
/// 2. `lsb_release -a`
/// 3. `<etc>/*-release` glob
/// 4. 위에서 판별 실패 시 패키지 매니저 실행 파일 직접 탐지 (첫 발견에서 중단)
pub async fn gather_distro_probe(runner: &dyn CommandRunner, etc_dir: &Path) -> DistroProbe {
    let mut probe = DistroProbe::default();

    if let Ok(text) = tokio::fs::read_to_string(etc_dir.join("os-release")).await {
        probe.distro_texts.push(text);
        if probe.family().is_some() {
            return probe;
        }
    }

    if let Ok(output) = runner.run(&CommandSpec::new("lsb_release").arg("-a")).await {
        if output.success && !output.stdout.trim().is_empty() {
            probe.distro_texts.push(output.stdout);
            if probe.family().is_some() {
                return probe;
            }
        }
    }

    let pattern = format!(
        "{}/*-release",
        glob::Pattern::escape(&etc_dir.to_string_lossy())
    );
    if let Ok(paths) = glob::glob(&pattern) {
        for path in paths.flatten() {
            if let Ok(text) = tokio::fs::read_to_string(&path).await {
                probe.distro_texts.push(text);
            }
        }
        if probe.family().is_some() {
            return probe;
        }
    }

    for pm in PackageManager::PROBE_ORDER {
        if runner.is_installed("which", pm.binary()).await {
            debug!(package_manager = pm.binary(), "패키지 매니저 탐지");
            probe.package_managers.push(pm);
            break;
        }
    }

    probe
}
