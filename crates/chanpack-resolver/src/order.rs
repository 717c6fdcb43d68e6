use chanpack_core::ChannelManifest;

pub fn apply_install_priority(names: Vec<String>, manifest: &ChannelManifest) -> Vec<String> {
    let mut middle = names;
    let mut head = Vec::new();
    let mut tail = Vec::new();

    for name in &manifest.install_first {
        if manifest.install_last.contains(name) {
            continue;
        }
        if let Some(position) = middle.iter().position(|candidate| candidate == name) {
            head.push(middle.remove(position));
        }
    }

    for name in &manifest.install_last {
        if let Some(position) = middle.iter().position(|candidate| candidate == name) {
            tail.push(middle.remove(position));
        }
    }

    head.extend(middle);
    head.extend(tail);
    head
}

pub fn apply_uninstall_priority(names: Vec<String>, manifest: &ChannelManifest) -> Vec<String> {
    let mut middle = names;
    let mut head = Vec::new();
    let mut tail = Vec::new();

    for name in manifest.install_last.iter().rev() {
        if let Some(position) = middle.iter().position(|candidate| candidate == name) {
            head.push(middle.remove(position));
        }
    }

    for name in manifest.install_first.iter().rev() {
        if manifest.install_last.contains(name) {
            continue;
        }
        if let Some(position) = middle.iter().position(|candidate| candidate == name) {
            tail.push(middle.remove(position));
        }
    }

    head.extend(middle);
    head.extend(tail);
    head
}
