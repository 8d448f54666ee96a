use std::path::{Path, PathBuf};

use anyhow::Error;

use patemon_api::{constants::IMAGE_EXTENSION, error::PreconditionError};

use crate::prompt::{choose_index, Prompter};

/// Picks the image file to write. A single image is taken as-is, several
/// bring up a numbered menu. No image at all is a precondition failure.
/// Returns None when the operator exits the menu.
pub fn choose_image(
    dir: impl AsRef<Path>,
    prompter: &mut dyn Prompter,
) -> Result<Option<PathBuf>, Error> {
    let dir = dir.as_ref();
    let mut images = osutils::image::find_images(dir, IMAGE_EXTENSION)?;

    match images.len() {
        0 => Err(PreconditionError::NoImagesFound(dir.to_path_buf()).into()),
        1 => Ok(images.pop()),
        _ => {
            println!("Choose image:");
            for (i, image) in images.iter().enumerate() {
                println!("  {} {}", i + 1, image.display());
            }
            Ok(choose_index(prompter, images.len())?.map(|index| images[index].clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use crate::prompt::testing::ScriptedPrompter;

    use super::*;

    #[test]
    fn test_single_image_needs_no_prompt() {
        let dir = tempfile::TempDir::new().unwrap();
        fs::write(dir.path().join("raspbian.img"), "").unwrap();

        let mut prompter = ScriptedPrompter::new(Vec::<String>::new());
        assert_eq!(
            choose_image(dir.path(), &mut prompter).unwrap(),
            Some(dir.path().join("raspbian.img"))
        );
        assert!(prompter.exhausted());
    }

    #[test]
    fn test_multiple_images_menu() {
        let dir = tempfile::TempDir::new().unwrap();
        fs::write(dir.path().join("2019-09.img"), "").unwrap();
        fs::write(dir.path().join("2019-11.img"), "").unwrap();

        let mut prompter = ScriptedPrompter::new(["2"]);
        assert_eq!(
            choose_image(dir.path(), &mut prompter).unwrap(),
            Some(dir.path().join("2019-11.img"))
        );

        let mut prompter = ScriptedPrompter::new([""]);
        assert_eq!(choose_image(dir.path(), &mut prompter).unwrap(), None);
    }

    #[test]
    fn test_no_images_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let error = choose_image(dir.path(), &mut ScriptedPrompter::new(Vec::<String>::new()))
            .unwrap_err();
        assert!(matches!(
            error.downcast_ref::<PreconditionError>(),
            Some(PreconditionError::NoImagesFound(_))
        ));
    }
}
